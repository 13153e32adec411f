//! Syntax analysis of a tokenized TDDF description.
//!
//! Every logical line is checked on its own: command lines against the grammar
//! of their command, attribute lines against the `NAME TYPE DELIMITER` grammar
//! of their reserved name. Array and date declarations are validated
//! recursively. The first offending line rejects the whole description.

use std::sync::OnceLock;

use regex::Regex;

use crate::datetime::{DatePattern, DatePatternError};
use crate::grammar::{
    Keyword, LexicalClass, MAX_DECIMAL_PREC, NUM_PARAMS_ATTR, NUM_PARAMS_CMD, Token,
};
use crate::lexer;

/// A rejected declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// Wrong number of tokens in a declaration
    ParameterCount {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Attribute name with characters other than letters, digits and underscore
    AttributeName(String),
    /// Attribute declaration not matching the grammar of its name
    Attribute { name: String, reason: String },
    /// Command declaration not matching the grammar of its command
    Command { name: String, reason: String },
    /// Malformed `ARRAY(...)` declaration
    Array { declaration: String, reason: String },
    /// Malformed `DATETIME["..."]` declaration
    DateTime {
        declaration: String,
        pattern: Option<DatePatternError>,
    },
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::ParameterCount {
                name,
                expected,
                found,
            } => write!(
                f,
                "Declaration '{}' must contain {} parameters, found {}",
                name, expected, found
            ),
            SyntaxError::AttributeName(name) => write!(
                f,
                "Attribute name '{}' must only contain letters, digits and underscores, and must not start with a digit",
                name
            ),
            SyntaxError::Attribute { name, reason } => {
                write!(f, "Attribute declaration '{}' is in a wrong format: {}", name, reason)
            }
            SyntaxError::Command { name, reason } => {
                write!(f, "Command declaration '{}' is in a wrong format: {}", name, reason)
            }
            SyntaxError::Array {
                declaration,
                reason,
            } => write!(f, "Array declaration '{}' is in a wrong format: {}", declaration, reason),
            SyntaxError::DateTime {
                declaration,
                pattern: Some(e),
            } => write!(f, "Pattern of DATETIME declaration '{}' is invalid: {}", declaration, e),
            SyntaxError::DateTime {
                declaration,
                pattern: None,
            } => write!(f, "DATETIME declaration '{}' is in a wrong format", declaration),
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyntaxError::DateTime {
                pattern: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

/// Validates every declaration line of `tokens`.
///
/// # Examples
/// ```text
/// _ID STRING ;                 ok
/// _ID ARRAY(_X DECIMAL ,) ;    _ID must be a basic type
/// _SPATIAL_DIM 4               dimensions must be 1, 2 or 3
/// ```
pub fn analyze(tokens: &[Token]) -> Result<(), SyntaxError> {
    for line in declaration_lines(tokens) {
        let result = if line[0].is(LexicalClass::Command) {
            analyze_command(line)
        } else {
            analyze_attribute(line)
        };
        if let Err(e) = result {
            log::error!("{}", e);
            return Err(e);
        }
    }
    Ok(())
}

/// Splits a token sequence into its declaration lines.
pub fn declaration_lines(tokens: &[Token]) -> impl Iterator<Item = &[Token]> {
    tokens
        .split(|t| t.is(LexicalClass::EndOfLine))
        .filter(|line| !line.is_empty())
}

fn analyze_attribute(line: &[Token]) -> Result<(), SyntaxError> {
    let name = &line[0];
    if line.len() != NUM_PARAMS_ATTR {
        return Err(SyntaxError::ParameterCount {
            name: name.value.clone(),
            expected: NUM_PARAMS_ATTR,
            found: line.len(),
        });
    }
    if !attribute_name_regex().is_some_and(|re| re.is_match(&name.value)) {
        return Err(SyntaxError::AttributeName(name.value.clone()));
    }

    let ty = &line[1];
    let delim = &line[2];
    let attribute_error = |reason: &str| SyntaxError::Attribute {
        name: name.value.clone(),
        reason: reason.to_string(),
    };

    if !name.is(LexicalClass::Attribute) {
        return Err(attribute_error("name is a reserved word"));
    }
    if !delim.is(LexicalClass::Delimiter) {
        return Err(attribute_error("expected a delimiter as third parameter"));
    }

    match Keyword::lookup(&name.value) {
        Some(Keyword::Id) => {
            if !ty.is(LexicalClass::Type) {
                return Err(attribute_error("must be of a basic type"));
            }
        }
        Some(Keyword::Coordinates) => {
            if !ty.is(LexicalClass::ArrayType) {
                return Err(attribute_error("must be of an ARRAY type"));
            }
        }
        _ => {
            if !matches!(
                ty.class,
                LexicalClass::Type | LexicalClass::ArrayType | LexicalClass::DateType
            ) {
                return Err(attribute_error("unknown type"));
            }
        }
    }

    match ty.class {
        LexicalClass::ArrayType => analyze_array(&ty.value),
        LexicalClass::DateType => analyze_date_type(&ty.value),
        _ => Ok(()),
    }
}

fn analyze_command(line: &[Token]) -> Result<(), SyntaxError> {
    let cmd = &line[0];
    if line.len() != NUM_PARAMS_CMD {
        return Err(SyntaxError::ParameterCount {
            name: cmd.value.clone(),
            expected: NUM_PARAMS_CMD,
            found: line.len(),
        });
    }
    let value = &line[1];
    let command_error = |reason: &str| SyntaxError::Command {
        name: cmd.value.clone(),
        reason: reason.to_string(),
    };

    match Keyword::lookup(&cmd.value) {
        Some(Keyword::CoordSystem) => {
            if !value.is(LexicalClass::CoordinateSystem) {
                return Err(command_error("expected CARTESIAN or GEOGRAPHIC"));
            }
        }
        Some(Keyword::SpatialDim) => {
            if !matches!(value.value.as_str(), "1" | "2" | "3") {
                return Err(command_error("dimensions must be 1, 2 or 3"));
            }
        }
        Some(Keyword::IgnoreLines) => {
            if !ignore_lines_regex().is_some_and(|re| re.is_match(&value.value)) {
                return Err(command_error("expected a list such as [1,3-5]"));
            }
        }
        Some(Keyword::AutoId) => {
            if !value.is(LexicalClass::GenericString) {
                return Err(command_error("check ID prefix declaration"));
            }
        }
        Some(Keyword::IgnoreAttr) => {
            if !value.is(LexicalClass::Delimiter) {
                return Err(command_error("check attribute delimiter"));
            }
        }
        Some(Keyword::RecordsDelim) => {
            if !value.is(LexicalClass::Delimiter) {
                return Err(command_error("check records delimiter"));
            }
        }
        Some(Keyword::DecimalPrec) => {
            if value.value.is_empty() || !value.value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(command_error("decimal precision must be an integer number"));
            }
            if value.value.parse::<u32>().map_or(true, |p| p > MAX_DECIMAL_PREC) {
                return Err(command_error(&format!(
                    "decimal precision must not exceed {}",
                    MAX_DECIMAL_PREC
                )));
            }
        }
        Some(Keyword::OutputFormat) => {
            if !value.is(LexicalClass::Format) {
                return Err(command_error("expected ALL, SPATIAL or SPATIAL_TEMPORAL"));
            }
        }
        _ => {
            if !matches!(
                value.class,
                LexicalClass::GenericString | LexicalClass::Delimiter
            ) {
                return Err(command_error("expected a string or a delimiter"));
            }
        }
    }
    Ok(())
}

/// Validates an `ARRAY(...)` declaration and each of its inner attributes.
pub fn analyze_array(declaration: &str) -> Result<(), SyntaxError> {
    let array_error = |reason: &str| SyntaxError::Array {
        declaration: declaration.to_string(),
        reason: reason.to_string(),
    };

    if !array_shape_regex().is_some_and(|re| re.is_match(declaration)) {
        return Err(array_error("expected ARRAY(name TYPE delimiter ...)"));
    }

    let tokens = lexer::analyze_array(declaration);
    if tokens.is_empty() || tokens.len() % NUM_PARAMS_ATTR != 0 {
        return Err(array_error("number of parameters does not match"));
    }

    for triple in tokens.chunks(NUM_PARAMS_ATTR) {
        let (name, ty, delim) = (&triple[0], &triple[1], &triple[2]);
        let type_ok = match Keyword::lookup(&name.value) {
            Some(Keyword::X | Keyword::Y | Keyword::Lon | Keyword::Lat) => {
                matches!(ty.class, LexicalClass::Type | LexicalClass::DeltaType)
            }
            Some(Keyword::Time) => matches!(
                ty.class,
                LexicalClass::Type | LexicalClass::DeltaType | LexicalClass::DateType
            ),
            _ => matches!(ty.class, LexicalClass::Type | LexicalClass::DateType),
        };
        if !name.is(LexicalClass::Attribute) || !type_ok || !delim.is(LexicalClass::Delimiter) {
            return Err(array_error(&format!(
                "inner attribute '{}' is in a wrong format",
                name.value
            )));
        }
        if ty.is(LexicalClass::DateType) {
            analyze_date_type(&ty.value)?;
        }
    }
    Ok(())
}

/// Validates a `DATETIME["..."]` declaration and compiles its pattern.
pub fn analyze_date_type(declaration: &str) -> Result<(), SyntaxError> {
    date_pattern_of(declaration).map(|_| ())
}

/// Extracts and compiles the pattern of a `DATETIME["..."]` declaration.
pub fn date_pattern_of(declaration: &str) -> Result<DatePattern, SyntaxError> {
    let shape_ok = date_shape_regex().is_some_and(|re| re.is_match(declaration));
    let (Some(start), Some(end)) = (declaration.find("[\""), declaration.rfind("\"]")) else {
        return Err(SyntaxError::DateTime {
            declaration: declaration.to_string(),
            pattern: None,
        });
    };
    if !shape_ok || start + 2 > end {
        return Err(SyntaxError::DateTime {
            declaration: declaration.to_string(),
            pattern: None,
        });
    }
    DatePattern::compile(&declaration[start + 2..end]).map_err(|e| SyntaxError::DateTime {
        declaration: declaration.to_string(),
        pattern: Some(e),
    })
}

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn attribute_name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^[A-Za-z_][A-Za-z0-9_]*$")
}

fn ignore_lines_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^\[\d+(-\d+)?(,\d+(-\d+)?)*\]$")
}

fn array_shape_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(
        &RE,
        r#"(?i)^ARRAY\((\s*\w+\s+(DATETIME\[".+?"\]|ARRAY\(.+\)|\w+)\s+(\W|LN|LS|EOF)\s*)+\)$"#,
    )
}

fn date_shape_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r#"(?i)^DATETIME\[".*"\]$"#)
}
