//! Date patterns of `DATETIME["..."]` declarations.
//!
//! Patterns use the familiar letter notation (`yyyy-MM-dd HH:mm:ss`) and are
//! compiled once into a `chrono` format string. Parsed values are normalized to
//! millisecond epochs; values without zone information are read as UTC.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::grammar::DATE_BOND;

/// Errors raised while compiling a date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePatternError {
    /// The pattern is empty
    Empty,
    /// A pattern letter with no equivalent
    UnsupportedLetter(char),
    /// A quoted literal was never closed
    UnterminatedQuote,
    /// The translated pattern was rejected
    Invalid(String),
}

impl std::fmt::Display for DatePatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatePatternError::Empty => write!(f, "Date pattern is empty"),
            DatePatternError::UnsupportedLetter(c) => {
                write!(f, "Unsupported date pattern letter '{}'", c)
            }
            DatePatternError::UnterminatedQuote => {
                write!(f, "Unterminated quoted literal in date pattern")
            }
            DatePatternError::Invalid(p) => write!(f, "Invalid date pattern: {}", p),
        }
    }
}

impl std::error::Error for DatePatternError {}

/// A value that does not match its declared date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateValueError {
    pub value: String,
    pub pattern: String,
    source: chrono::ParseError,
}

impl std::fmt::Display for DateValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' does not match date pattern \"{}\": {}",
            self.value, self.pattern, self.source
        )
    }
}

impl std::error::Error for DateValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    format: String,
    has_time: bool,
    has_zone: bool,
}

impl DatePattern {
    /// Compiles a pattern, restoring any whitespace bonded by the lexer.
    ///
    /// # Examples
    /// ```text
    /// yyyy-MM-dd HH:mm:ss   ->  %Y-%m-%d %H:%M:%S
    /// M/d/yyyy h:mm:ss a    ->  %m/%d/%Y %I:%M:%S %p
    /// yyyy-MM-dd'T'HH:mm    ->  %Y-%m-%dT%H:%M
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, DatePatternError> {
        let source: String = pattern
            .chars()
            .map(|c| if c == DATE_BOND { ' ' } else { c })
            .collect();
        if source.trim().is_empty() {
            return Err(DatePatternError::Empty);
        }

        let chars: Vec<char> = source.chars().collect();
        let mut format = String::new();
        let mut has_time = false;
        let mut has_zone = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    format.push('\'');
                    i += 2;
                    continue;
                }
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(DatePatternError::UnterminatedQuote),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            format.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(&lit) => {
                            push_literal(&mut format, lit);
                            i += 1;
                        }
                    }
                }
                continue;
            }

            if !c.is_ascii_alphabetic() {
                push_literal(&mut format, c);
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&n| n == c).count();
            let spec = match (c, run) {
                ('y' | 'u', 2) => "%y",
                ('y' | 'u', _) => "%Y",
                ('M', 1 | 2) => "%m",
                ('M', 3) => "%b",
                ('M', _) => "%B",
                ('d', _) => "%d",
                ('D', _) => "%j",
                ('E', 1..=3) => "%a",
                ('E', _) => "%A",
                ('a', _) => "%p",
                ('H' | 'k', _) => "%H",
                ('h' | 'K', _) => "%I",
                ('m', _) => "%M",
                ('s', _) => "%S",
                ('S', 1..=3) => "%3f",
                ('S', 4..=6) => "%6f",
                ('S', _) => "%9f",
                ('Z', _) => "%z",
                ('X' | 'x', 1 | 2) => "%z",
                ('X' | 'x', _) => "%:z",
                (other, _) => return Err(DatePatternError::UnsupportedLetter(other)),
            };
            match c {
                'H' | 'k' | 'h' | 'K' | 'm' | 's' | 'S' => has_time = true,
                'Z' | 'X' | 'x' => has_zone = true,
                _ => {}
            }
            format.push_str(spec);
            i += run;
        }

        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(DatePatternError::Invalid(source));
        }

        Ok(DatePattern {
            source,
            format,
            has_time,
            has_zone,
        })
    }

    /// The pattern as declared, with whitespace restored.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The translated `chrono` format string.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Parses `value` and returns its epoch in milliseconds.
    ///
    /// Date-only patterns resolve to midnight.
    pub fn parse_epoch_millis(&self, value: &str) -> Result<i64, DateValueError> {
        let value = value.trim();
        let parsed = if self.has_zone {
            DateTime::parse_from_str(value, &self.format).map(|dt| dt.timestamp_millis())
        } else if self.has_time {
            NaiveDateTime::parse_from_str(value, &self.format)
                .map(|dt| dt.and_utc().timestamp_millis())
        } else {
            NaiveDate::parse_from_str(value, &self.format).map(|d| {
                d.and_time(chrono::NaiveTime::MIN)
                    .and_utc()
                    .timestamp_millis()
            })
        };
        parsed.map_err(|source| DateValueError {
            value: value.to_string(),
            pattern: self.source.clone(),
            source,
        })
    }
}

fn push_literal(format: &mut String, c: char) {
    if c == '%' {
        format.push_str("%%");
    } else {
        format.push(c);
    }
}
