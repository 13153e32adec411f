use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::OnceLock;

use super::{ArrayFormat, Format};
use crate::grammar::{
    CoordinateSystem, DEFAULT_DECIMAL_PREC, Keyword, LINE_SPACE, LexicalClass, NUM_PARAMS_ATTR,
    NUM_PARAMS_CMD, OutputFormat, Token,
};
use crate::syntax;

/// How raw input lines are grouped into logical records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordDelimiter {
    /// One record per physical line
    #[default]
    LineBreak,
    /// The whole file is one record
    EndOfFile,
    /// A new record starts at every line beginning with this text
    Text(String),
}

impl RecordDelimiter {
    fn from_value(value: &str) -> Self {
        match Keyword::lookup(value) {
            Some(Keyword::LineBreak) => RecordDelimiter::LineBreak,
            Some(Keyword::EndOfFile) => RecordDelimiter::EndOfFile,
            Some(Keyword::LineSpace) => RecordDelimiter::Text(LINE_SPACE.to_string()),
            _ => RecordDelimiter::Text(value.to_string()),
        }
    }
}

/// The compiled TDDF description: attributes plus command settings.
#[derive(Debug, Clone)]
pub struct DataFormat {
    format: Format,
    coordinates: Option<ArrayFormat>,
    coordinate_system: String,
    decimal_precision: u32,
    output_format: OutputFormat,
    record_delimiter: RecordDelimiter,
    auto_id_prefix: Option<String>,
    ignored_lines: BTreeSet<usize>,
    id_pos: OnceLock<Option<usize>>,
    coordinates_pos: OnceLock<Option<usize>>,
}

impl Default for DataFormat {
    fn default() -> Self {
        DataFormat {
            format: Format::new(),
            coordinates: None,
            coordinate_system: CoordinateSystem::default().name().to_string(),
            decimal_precision: DEFAULT_DECIMAL_PREC,
            output_format: OutputFormat::default(),
            record_delimiter: RecordDelimiter::default(),
            auto_id_prefix: None,
            ignored_lines: BTreeSet::new(),
            id_pos: OnceLock::new(),
            coordinates_pos: OnceLock::new(),
        }
    }
}

impl DataFormat {
    /// Builds the model from a token sequence.
    ///
    /// Expects tokens that passed syntax and semantic analysis. Lines with the
    /// wrong number of tokens are skipped, unknown commands are ignored.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut data = DataFormat::default();

        for line in syntax::declaration_lines(tokens) {
            if line[0].is(LexicalClass::Command) {
                if line.len() == NUM_PARAMS_CMD {
                    data.add_command(&line[0].value, &line[1].value);
                } else {
                    log::debug!("skipping malformed command '{}'", line[0].value);
                }
            } else if line.len() == NUM_PARAMS_ATTR {
                let (name, ty, delim) = (&line[0].value, &line[1].value, &line[2].value);
                if Keyword::Coordinates.matches(name) && data.coordinates.is_none() {
                    data.coordinates = Some(ArrayFormat::from_declaration(ty));
                }
                data.format.add_attribute(name.as_str(), ty.as_str(), delim);
            } else {
                log::debug!("skipping malformed attribute '{}'", line[0].value);
            }
        }
        data
    }

    fn add_command(&mut self, name: &str, value: &str) {
        match Keyword::lookup(name) {
            Some(Keyword::IgnoreAttr) => self.format.add_ignored(value),
            Some(Keyword::IgnoreLines) => self.ignored_lines.extend(parse_ignored_lines(value)),
            Some(Keyword::CoordSystem) => self.coordinate_system = value.to_string(),
            Some(Keyword::AutoId) => self.auto_id_prefix = Some(value.to_string()),
            Some(Keyword::RecordsDelim) => self.record_delimiter = RecordDelimiter::from_value(value),
            Some(Keyword::OutputFormat) => match value.parse() {
                Ok(shape) => self.output_format = shape,
                Err(e) => log::warn!("{}, keeping {}", e, self.output_format),
            },
            Some(Keyword::DecimalPrec) => match value.parse() {
                Ok(prec) => self.decimal_precision = prec,
                Err(_) => log::warn!(
                    "invalid decimal precision '{}', keeping {}",
                    value,
                    self.decimal_precision
                ),
            },
            _ => log::debug!("ignoring command '{}'", name),
        }
    }

    /// Format of the `_COORDINATES` array, if declared.
    pub fn coordinates(&self) -> Option<&ArrayFormat> {
        self.coordinates.as_ref()
    }

    pub fn id_index(&self) -> Option<usize> {
        *self
            .id_pos
            .get_or_init(|| self.format.position_of(Keyword::Id.name()))
    }

    pub fn coordinates_index(&self) -> Option<usize> {
        *self
            .coordinates_pos
            .get_or_init(|| self.format.position_of(Keyword::Coordinates.name()))
    }

    /// Resolved coordinate system, `None` when the declared name is unknown.
    pub fn coordinate_system(&self) -> Option<CoordinateSystem> {
        self.coordinate_system.parse().ok()
    }

    /// Coordinate system as declared.
    pub fn coordinate_system_name(&self) -> &str {
        &self.coordinate_system
    }

    pub fn decimal_precision(&self) -> u32 {
        self.decimal_precision
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn record_delimiter(&self) -> &RecordDelimiter {
        &self.record_delimiter
    }

    pub fn auto_id_prefix(&self) -> Option<&str> {
        self.auto_id_prefix.as_deref()
    }

    pub fn is_auto_id(&self) -> bool {
        self.auto_id_prefix.is_some()
    }

    /// True when the auto-ID prefix is a plain number, so IDs continue it.
    pub fn is_numeric_auto_id(&self) -> bool {
        self.auto_id_prefix
            .as_deref()
            .is_some_and(|p| p.parse::<u64>().is_ok())
    }

    /// Zero-based physical line numbers to drop from every input file.
    pub fn ignored_lines(&self) -> &BTreeSet<usize> {
        &self.ignored_lines
    }

    pub fn has_lines_to_ignore(&self) -> bool {
        !self.ignored_lines.is_empty()
    }

    /// Valid attributes, counting an auto-generated ID as one.
    pub fn num_valid_attributes(&self) -> usize {
        self.format.num_valid_attributes() + usize::from(self.is_auto_id())
    }
}

impl Deref for DataFormat {
    type Target = Format;

    fn deref(&self) -> &Format {
        &self.format
    }
}

/// Expands `[n,a-b,...]` (one-based) into zero-based line numbers.
///
/// # Examples
/// ```text
/// [2,4-5]  ->  {1, 3, 4}
/// [1]      ->  {0}
/// ```
pub fn parse_ignored_lines(value: &str) -> BTreeSet<usize> {
    let mut lines = BTreeSet::new();
    let body = value.trim().trim_start_matches('[').trim_end_matches(']');

    for item in body.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (begin, end) = match item.split_once('-') {
            Some((a, b)) => (a.trim().parse::<usize>(), b.trim().parse::<usize>()),
            None => (item.parse::<usize>(), item.parse::<usize>()),
        };
        match (begin, end) {
            (Ok(a), Ok(b)) if a >= 1 && a <= b => lines.extend(a - 1..b),
            _ => log::warn!("ignoring invalid line interval '{}'", item),
        }
    }
    lines
}

/// Intervals `a-b` of an ignore-lines value where `a > b`.
pub fn inverted_intervals(value: &str) -> Vec<(usize, usize)> {
    let body = value.trim().trim_start_matches('[').trim_end_matches(']');
    body.split(',')
        .filter_map(|item| item.split_once('-'))
        .filter_map(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)))
        .filter(|&(a, b): &(usize, usize)| a > b)
        .collect()
}
