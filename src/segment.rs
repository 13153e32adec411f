//! Pre-segmentation of raw input lines into logical records.

use crate::format::{DataFormat, RecordDelimiter};
use crate::grammar::LINE_BOND;

/// Groups the physical lines of one input file into records.
///
/// Ignored line numbers (zero-based) are dropped first. Physical lines that
/// end up in the same record are joined with the line bond character. Blank
/// records are skipped.
///
/// # Examples
/// ```text
/// _RECORDS_DELIM LN      a / b / c       ->  [a] [b] [c]
/// _RECORDS_DELIM EOF     a / b / c       ->  [a·b·c]
/// _RECORDS_DELIM #       #a / b / #c     ->  [a·b] [c]
/// ```
pub fn segment_records<S: AsRef<str>>(lines: &[S], format: &DataFormat) -> Vec<String> {
    let ignored = format.ignored_lines();
    let kept = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !ignored.contains(i))
        .map(|(_, line)| line.as_ref());

    let records: Vec<String> = match format.record_delimiter() {
        RecordDelimiter::LineBreak => kept.map(str::to_string).collect(),
        RecordDelimiter::EndOfFile => {
            let joined = kept.collect::<Vec<_>>().join(&LINE_BOND.to_string());
            vec![joined]
        }
        RecordDelimiter::Text(delimiter) => split_on_prefix(kept, delimiter),
    };

    records
        .into_iter()
        .filter(|r| !r.trim().is_empty())
        .collect()
}

fn split_on_prefix<'a>(lines: impl Iterator<Item = &'a str>, delimiter: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current: Option<String> = None;

    for line in lines {
        if let Some(stripped) = line.strip_prefix(delimiter) {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(stripped.to_string());
        } else {
            match current.as_mut() {
                Some(record) if !record.is_empty() => {
                    record.push(LINE_BOND);
                    record.push_str(line);
                }
                _ => current = Some(line.to_string()),
            }
        }
    }
    records.extend(current);
    records
}
