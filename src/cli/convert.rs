//! JSON rendering of compiled formats and run reports

use serde_json::{Map, Value, json};

use crate::format::{DataFormat, Format, RecordDelimiter};
use crate::loader::LoadReport;
use crate::statistics::StatisticsReport;

fn attributes_to_json(format: &Format) -> Value {
    Value::Array(
        format
            .attributes()
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "type": a.attr_type,
                    "delimiter": a.delimiter,
                    "ignored": a.is_ignored(),
                })
            })
            .collect(),
    )
}

/// Convert a compiled TDDF description to JSON
pub fn format_to_json(format: &DataFormat) -> Value {
    let records_delimiter = match format.record_delimiter() {
        RecordDelimiter::LineBreak => "LN".to_string(),
        RecordDelimiter::EndOfFile => "EOF".to_string(),
        RecordDelimiter::Text(text) => text.clone(),
    };
    let coordinates = format.coordinates().map(|c| {
        json!({
            "declaration": c.declaration(),
            "attributes": attributes_to_json(c),
            "x_index": c.x_index(),
            "y_index": c.y_index(),
            "time_index": c.time_index(),
            "spatial_dimensions": c.spatial_dimensions(),
        })
    });

    json!({
        "attributes": attributes_to_json(format),
        "id_index": format.id_index(),
        "coordinates_index": format.coordinates_index(),
        "coordinates": coordinates,
        "coordinate_system": format.coordinate_system_name(),
        "decimal_precision": format.decimal_precision(),
        "output_format": format.output_format().name(),
        "records_delimiter": records_delimiter,
        "auto_id": format.auto_id_prefix(),
        "ignored_lines": format.ignored_lines().iter().map(|l| l + 1).collect::<Vec<_>>(),
        "valid_attributes": format.num_valid_attributes(),
    })
}

/// Convert a statistics report to a JSON object keyed by report name
pub fn statistics_to_json(report: &StatisticsReport) -> Value {
    let entries: Map<String, Value> = report
        .entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value)))
        .collect();
    Value::Object(entries)
}

/// Convert a load run report to JSON
pub fn report_to_json(report: &LoadReport) -> Value {
    json!({
        "files": report.files,
        "failed_files": report.failed_files,
        "records_written": report.records_written,
        "records_dropped": report.records_dropped,
        "trajectories": report.trajectories,
        "statistics": statistics_to_json(&report.statistics),
    })
}
