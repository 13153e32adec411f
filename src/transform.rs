//! # Record Transformation
//!
//! Turns one raw record into its canonical output line:
//!
//! 1. split the record into attribute values by their delimiters
//! 2. resolve the trajectory ID (declared or auto-generated)
//! 3. split the coordinates array into points and pull out X, Y and Time
//! 4. convert `DATETIME` times to epoch milliseconds and repair backwards steps
//! 5. delta-encode X, Y and Time and scale decimals to integers
//! 6. assemble `id;coordinates[;attributes]` for the requested output shape
//!
//! [`RecordTransformer::prepare`] returns the line together with the
//! trajectory's statistics sample, leaving it to the caller to fold the sample
//! once the line is safely stored. [`RecordTransformer::transform`] folds it
//! right away.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::compiler::FormatError;
use crate::datetime::{DatePattern, DateValueError};
use crate::delta;
use crate::format::{ArrayFormat, AttributeEntry, DataFormat};
use crate::grammar::{Keyword, OutputFormat};
use crate::semantic::SemanticError;
use crate::statistics::{StatisticsEngine, StatisticsError, TrajectorySample};
use crate::syntax::{self, SyntaxError};

/// Why a single record was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record has no value at the coordinates position
    MissingCoordinates,
    /// The coordinates array holds no items
    EmptyCoordinates,
    /// Item count is not a multiple of the number of array attributes
    ArityMismatch { items: usize, arity: usize },
    /// A numeric coordinate that does not parse as a number
    InvalidNumber { value: String },
    /// A time value not matching its `DATETIME` pattern
    InvalidDate(DateValueError),
    /// A value whose delta, scaled form or generated ID does not fit
    Overflow { value: String },
    Statistics(StatisticsError),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingCoordinates => write!(f, "Record has no coordinates attribute"),
            RecordError::EmptyCoordinates => write!(f, "Coordinates array is empty"),
            RecordError::ArityMismatch { items, arity } => write!(
                f,
                "Coordinates array has {} items, not a multiple of {} attributes",
                items, arity
            ),
            RecordError::InvalidNumber { value } => {
                write!(f, "Coordinate value '{}' is not a number", value)
            }
            RecordError::InvalidDate(e) => write!(f, "{}", e),
            RecordError::Overflow { value } => {
                write!(f, "Value '{}' overflows its numeric range", value)
            }
            RecordError::Statistics(e) => write!(f, "Statistics error: {}", e),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::InvalidDate(e) => Some(e),
            RecordError::Statistics(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DateValueError> for RecordError {
    fn from(e: DateValueError) -> Self {
        RecordError::InvalidDate(e)
    }
}

impl From<StatisticsError> for RecordError {
    fn from(e: StatisticsError) -> Self {
        RecordError::Statistics(e)
    }
}

/// Values of one coordinate axis across the points of a trajectory.
#[derive(Debug, Clone, PartialEq)]
enum Series {
    /// Numbers as declared: absolute, or delta-encoded when `delta` is set
    Numeric {
        values: Vec<Decimal>,
        delta: bool,
        decimal: bool,
    },
    /// Values of a non-numeric type, passed through untouched
    Text(Vec<String>),
}

impl Series {
    fn parse(items: &[&str], attr: &AttributeEntry) -> Result<Self, RecordError> {
        if !attr.is_number_type() {
            return Ok(Series::Text(items.iter().map(|s| s.to_string()).collect()));
        }
        let values = items
            .iter()
            .map(|item| parse_number(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Series::Numeric {
            values,
            delta: attr.is_delta_type(),
            decimal: attr.is_decimal_type(),
        })
    }

    /// Epoch milliseconds of `DATETIME` values, as absolute integers.
    fn parse_dates(items: &[&str], pattern: &DatePattern) -> Result<Self, RecordError> {
        let values = items
            .iter()
            .map(|item| pattern.parse_epoch_millis(item.trim()).map(Decimal::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Series::Numeric {
            values,
            delta: false,
            decimal: false,
        })
    }

    /// Replaces any value smaller than its predecessor by the predecessor.
    fn repair_monotonic(&mut self) -> Result<(), RecordError> {
        if let Series::Numeric { values, delta, .. } = self {
            if *delta {
                delta::checked_decode_in_place(values).ok_or_else(|| overflow_of(values))?;
                *delta = false;
            }
            for i in 1..values.len() {
                if values[i] < values[i - 1] {
                    values[i] = values[i - 1];
                }
            }
        }
        Ok(())
    }

    /// Values handed to the statistics engine, zero-filled when not numeric.
    fn statistics_input(&self) -> (Vec<f64>, bool) {
        match self {
            Series::Numeric { values, delta, .. } => (
                values.iter().map(|v| v.to_f64().unwrap_or(0.0)).collect(),
                *delta,
            ),
            Series::Text(values) => (vec![0.0; values.len()], false),
        }
    }

    /// Canonical output form: delta-encoded integers, decimals scaled first.
    fn compress(&self, scale: Decimal) -> Result<Vec<String>, RecordError> {
        let (values, delta, decimal) = match self {
            Series::Text(values) => return Ok(values.clone()),
            Series::Numeric {
                values,
                delta,
                decimal,
            } => (values, *delta, *decimal),
        };
        let encoded = if delta {
            values.clone()
        } else {
            delta::checked_encode(values).ok_or_else(|| overflow_of(values))?
        };
        encoded
            .iter()
            .map(|&v| {
                let overflow = || RecordError::Overflow {
                    value: v.to_string(),
                };
                let scaled = if decimal {
                    v.checked_mul(scale).ok_or_else(overflow)?
                } else {
                    v
                };
                scaled
                    .trunc()
                    .to_i64()
                    .map(|n| n.to_string())
                    .ok_or_else(overflow)
            })
            .collect()
    }
}

fn overflow_of(values: &[Decimal]) -> RecordError {
    let value = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    RecordError::Overflow { value }
}

fn parse_number(item: &str) -> Result<Decimal, RecordError> {
    let trimmed = item.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| RecordError::InvalidNumber {
            value: item.to_string(),
        })
}

/// Splits a record into one value per attribute.
///
/// Each attribute consumes text up to the first occurrence of its delimiter.
/// An empty delimiter, or one that is not found, takes the rest of the record.
/// Attributes past the end of the record get empty values; ignored attributes
/// are consumed but left empty.
///
/// # Examples
/// ```text
/// _ID ;  _COORDINATES ;  NAME EOF
/// "t1;0,1,10;bus"   ->  ["t1", "0,1,10", "bus"]
/// "t1;0,1,10"       ->  ["t1", "0,1,10", ""]
/// ```
pub fn split_attributes<'a>(record: &'a str, format: &DataFormat) -> Vec<&'a str> {
    let mut values = Vec::with_capacity(format.num_attributes());
    let mut rest = Some(record);

    for attr in format.attributes() {
        let value = match rest {
            None => "",
            Some(text) => match text.find(attr.delimiter.as_str()) {
                Some(at) if !attr.delimiter.is_empty() => {
                    rest = Some(&text[at + attr.delimiter.len()..]);
                    &text[..at]
                }
                _ => {
                    rest = None;
                    text
                }
            },
        };
        values.push(if attr.is_ignored() { "" } else { value });
    }
    values
}

/// Splits the text of an array attribute into its flat list of items.
///
/// The array's delimiters are applied cyclically, one per item. A single
/// trailing empty item, left by a record ending in a delimiter, is dropped.
///
/// # Examples
/// ```text
/// ARRAY(_X DECIMAL , _Y DECIMAL ;)
/// "0,1;2,3;"  ->  ["0", "1", "2", "3"]
/// ```
pub fn split_array_items<'a>(text: &'a str, array: &ArrayFormat) -> Vec<&'a str> {
    let delimiters: Vec<&str> = array.delimiters().collect();
    let mut items = Vec::new();
    if delimiters.is_empty() {
        return items;
    }

    let mut rest = text;
    for delimiter in delimiters.iter().cycle() {
        match rest.find(delimiter) {
            Some(at) if !delimiter.is_empty() => {
                items.push(&rest[..at]);
                rest = &rest[at + delimiter.len()..];
            }
            _ => {
                items.push(rest);
                break;
            }
        }
    }
    if items.last().is_some_and(|last| last.is_empty()) {
        items.pop();
    }
    items
}

/// Replaces every delimiter of an array attribute by a comma.
fn flatten_array(text: &str, declaration: &str) -> String {
    let array = ArrayFormat::from_declaration(declaration);
    let mut flat = text.to_string();
    for delimiter in array.delimiters().filter(|d| !d.is_empty()) {
        flat = flat.replace(delimiter, ",");
    }
    flat
}

/// A transformed record and the statistics sample of its trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRecord {
    pub line: String,
    pub sample: TrajectorySample,
}

/// Transforms raw records of one dataset, sharing its statistics and ID counter.
///
/// `transform` takes `&self`, so a transformer can be used from many worker
/// threads at once.
#[derive(Debug)]
pub struct RecordTransformer {
    format: DataFormat,
    coordinates: ArrayFormat,
    output: OutputFormat,
    time_pattern: Option<DatePattern>,
    scale: Decimal,
    statistics: StatisticsEngine,
    next_id: AtomicU64,
}

impl RecordTransformer {
    /// Prepares a transformer for `format`, emitting records of shape `output`.
    ///
    /// Fails when the format has no usable coordinates array, when its time
    /// pattern does not compile, or when its decimal precision cannot be
    /// represented.
    pub fn new(
        format: DataFormat,
        output: OutputFormat,
        statistics: StatisticsEngine,
    ) -> Result<Self, FormatError> {
        let coordinates = match format.coordinates() {
            Some(array) => array.clone(),
            None => return Err(FormatError::Semantic(vec![SemanticError::MissingCoordinates])),
        };
        let mut missing = Vec::new();
        if coordinates.x_index().is_none() {
            missing.push(SemanticError::MissingX);
        }
        if coordinates.y_index().is_none() {
            missing.push(SemanticError::MissingY);
        }
        if coordinates.time_index().is_none() {
            missing.push(SemanticError::MissingTime);
        }
        if !missing.is_empty() {
            return Err(FormatError::Semantic(missing));
        }

        let time_pattern = match coordinates.time_index().and_then(|i| coordinates.attribute(i)) {
            Some(attr) if attr.is_datetime_type() => Some(syntax::date_pattern_of(&attr.attr_type)?),
            _ => None,
        };

        let mut scale = Decimal::ONE;
        for _ in 0..format.decimal_precision() {
            scale = scale
                .checked_mul(Decimal::TEN)
                .ok_or_else(|| SyntaxError::Command {
                    name: Keyword::DecimalPrec.name().to_string(),
                    reason: format!("precision {} is too large", format.decimal_precision()),
                })?;
        }

        Ok(RecordTransformer {
            format,
            coordinates,
            output,
            time_pattern,
            scale,
            statistics,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn format(&self) -> &DataFormat {
        &self.format
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
    }

    pub fn statistics(&self) -> &StatisticsEngine {
        &self.statistics
    }

    /// Transforms one record and folds its trajectory into the statistics.
    pub fn transform(&self, record: &str) -> Result<String, RecordError> {
        let transformed = self.prepare(record)?;
        self.statistics.add_sample(&transformed.sample);
        Ok(transformed.line)
    }

    /// Transforms one record into `id;coordinates[;attributes]` without
    /// touching the statistics.
    pub fn prepare(&self, record: &str) -> Result<TransformedRecord, RecordError> {
        let values = split_attributes(record, &self.format);
        let coordinates_text = self
            .format
            .coordinates_index()
            .and_then(|i| values.get(i))
            .copied()
            .ok_or(RecordError::MissingCoordinates)?;

        let items = split_array_items(coordinates_text, &self.coordinates);
        let arity = self.coordinates.num_attributes();
        if items.is_empty() {
            return Err(RecordError::EmptyCoordinates);
        }
        if items.len() % arity != 0 {
            return Err(RecordError::ArityMismatch {
                items: items.len(),
                arity,
            });
        }
        let points: Vec<&[&str]> = items.chunks(arity).collect();

        let (x, y, t) = self.axes(&points)?;
        let (x_out, y_out, t_out) = (
            x.compress(self.scale)?,
            y.compress(self.scale)?,
            t.compress(self.scale)?,
        );
        let coordinates = self.assemble_points(&points, &x_out, &y_out, &t_out);

        let sample = TrajectorySample::from_delta_encoded(
            pair(&x.statistics_input()),
            pair(&y.statistics_input()),
            pair(&t.statistics_input()),
        )?;

        let mut line = String::new();
        line.push_str(&self.resolve_id(&values)?);
        line.push(';');
        line.push_str(&coordinates);
        if self.output == OutputFormat::All {
            for attr in self.semantic_attributes(&values) {
                line.push(';');
                line.push_str(&attr);
            }
        }

        Ok(TransformedRecord { line, sample })
    }

    fn axes(&self, points: &[&[&str]]) -> Result<(Series, Series, Series), RecordError> {
        let (Some(xi), Some(yi), Some(ti)) = (
            self.coordinates.x_index(),
            self.coordinates.y_index(),
            self.coordinates.time_index(),
        ) else {
            return Err(RecordError::MissingCoordinates);
        };
        let attribute = |i: usize| self.coordinates.attribute(i).ok_or(RecordError::MissingCoordinates);

        let x = Series::parse(&column(points, xi), attribute(xi)?)?;
        let y = Series::parse(&column(points, yi), attribute(yi)?)?;
        let mut t = match &self.time_pattern {
            Some(pattern) => Series::parse_dates(&column(points, ti), pattern)?,
            None => Series::parse(&column(points, ti), attribute(ti)?)?,
        };
        t.repair_monotonic()?;
        Ok((x, y, t))
    }

    fn assemble_points(&self, points: &[&[&str]], xs: &[String], ys: &[String], ts: &[String]) -> String {
        let mut fields: Vec<&str> = Vec::new();
        for (k, point) in points.iter().enumerate() {
            fields.push(&xs[k]);
            fields.push(&ys[k]);
            if self.output == OutputFormat::Spatial {
                continue;
            }
            fields.push(&ts[k]);
            if self.output == OutputFormat::All {
                fields.extend(
                    point
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| self.coordinates.is_semantic(j))
                        .map(|(_, item)| *item),
                );
            }
        }
        fields.join(",")
    }

    /// Attributes other than the ID, the coordinates and ignored ones.
    fn semantic_attributes(&self, values: &[&str]) -> Vec<String> {
        let id = self.format.id_index();
        let coordinates = self.format.coordinates_index();
        self.format
            .attributes()
            .iter()
            .zip(values)
            .enumerate()
            .filter(|&(i, (attr, _))| Some(i) != id && Some(i) != coordinates && !attr.is_ignored())
            .map(|(_, (attr, value))| {
                if attr.is_array_type() {
                    flatten_array(value, &attr.attr_type)
                } else {
                    value.to_string()
                }
            })
            .collect()
    }

    fn resolve_id(&self, values: &[&str]) -> Result<String, RecordError> {
        let Some(prefix) = self.format.auto_id_prefix() else {
            return Ok(self
                .format
                .id_index()
                .and_then(|i| values.get(i))
                .map(|v| v.to_string())
                .unwrap_or_default());
        };
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        match prefix.parse::<u64>() {
            Ok(base) => base
                .checked_add(n)
                .map(|id| id.to_string())
                .ok_or_else(|| RecordError::Overflow {
                    value: format!("{}+{}", prefix, n),
                }),
            Err(_) => Ok(format!("{}_{}", prefix, n + 1)),
        }
    }
}

fn column<'a>(points: &[&[&'a str]], index: usize) -> Vec<&'a str> {
    points.iter().map(|point| point[index]).collect()
}

fn pair(input: &(Vec<f64>, bool)) -> (&[f64], bool) {
    (input.0.as_slice(), input.1)
}
