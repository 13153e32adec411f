//! Generated documents describing a load run's output.
//!
//! - the **output-format descriptor**, a TDDF-like script describing the shape
//!   of the transformed records
//! - the **metadata report**, file and attribute counts followed by the
//!   dataset statistics
//!
//! # Examples
//!
//! ```
//! use tddf_loader::compiler::compile_str;
//! use tddf_loader::grammar::OutputFormat;
//! use tddf_loader::output::output_format_descriptor;
//!
//! let format = compile_str(
//!     "_ID STRING ;\n_COORDINATES ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,) ;",
//! ).unwrap();
//! let script = output_format_descriptor(&format, OutputFormat::Spatial);
//! assert!(script.ends_with("_COORDINATES\tARRAY(_X DECIMAL _Y DECIMAL)"));
//! ```

use crate::format::DataFormat;
use crate::grammar::{Keyword, OutputFormat, keywords};
use crate::statistics::StatisticsReport;

/// Name of the generated output-format descriptor.
pub const OUTPUT_FORMAT_FILE: &str = "output-format.tddf";

/// Name of the generated metadata report.
pub const METADATA_FILE: &str = "metadata.meta";

/// Describes the records produced for `format` in output shape `shape`.
///
/// A `DATETIME` time is described as `INTEGER`, since it is emitted as epoch
/// milliseconds. Delta types are described by their basic type.
pub fn output_format_descriptor(format: &DataFormat, shape: OutputFormat) -> String {
    let coordinates = format.coordinates();
    let system = format
        .coordinate_system()
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| format.coordinate_system_name().to_string());

    let mut lines = vec![
        format!("{}\t{}", Keyword::OutputFormat.name(), shape),
        format!("{}\t{}", Keyword::CoordSystem.name(), system),
        format!("{}\t{}", Keyword::DecimalPrec.name(), format.decimal_precision()),
        format!(
            "{}\t{}",
            Keyword::SpatialDim.name(),
            coordinates.map_or(0, |c| c.spatial_dimensions())
        ),
    ];

    let id_type = match format.auto_id_prefix() {
        Some(_) if format.is_numeric_auto_id() => Some(Keyword::Integer.name()),
        Some(_) => Some(Keyword::String.name()),
        None => format
            .id_index()
            .and_then(|i| format.attribute(i))
            .map(|a| a.attr_type.as_str()),
    };
    if let Some(ty) = id_type {
        lines.push(format!("{}\t{}", Keyword::Id.name(), ty));
    }

    if let Some(array) = coordinates {
        let described_type = |index: Option<usize>, time: bool| {
            let attr = index.and_then(|i| array.attribute(i));
            match attr {
                Some(a) if time && a.is_datetime_type() => Keyword::Integer.name(),
                Some(a) => keywords::basic_type(&a.attr_type),
                None => Keyword::Decimal.name(),
            }
        };

        let mut items = vec![
            format!("{} {}", Keyword::X.name(), described_type(array.x_index(), false)),
            format!("{} {}", Keyword::Y.name(), described_type(array.y_index(), false)),
        ];
        if shape != OutputFormat::Spatial {
            items.push(format!(
                "{} {}",
                Keyword::Time.name(),
                described_type(array.time_index(), true)
            ));
        }
        if shape == OutputFormat::All {
            items.extend(
                array
                    .attributes()
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| array.is_semantic(i))
                    .map(|(_, a)| format!("{} {}", a.name, a.attr_type)),
            );
        }
        lines.push(format!(
            "{}\t{}({})",
            Keyword::Coordinates.name(),
            Keyword::Array.name(),
            items.join(" ")
        ));
    }

    if shape == OutputFormat::All {
        let id = format.id_index();
        let coordinates = format.coordinates_index();
        lines.extend(
            format
                .attributes()
                .iter()
                .enumerate()
                .filter(|&(i, a)| Some(i) != id && Some(i) != coordinates && !a.is_ignored())
                .map(|(_, a)| format!("{}\t{}", a.name, a.attr_type)),
        );
    }

    lines.join("\n")
}

/// Counts of the output followed by the dataset statistics.
///
/// # Examples
/// ```text
/// NUM_FILES               4
/// NUM_ATTRIBUTES          2
/// NUM_COORD_ATTRIBUTES    3
/// NUM_TRAJECTORIES        120
/// ...
/// ```
pub fn metadata_report(
    format: &DataFormat,
    shape: OutputFormat,
    files: usize,
    statistics: &StatisticsReport,
) -> String {
    let dimensions = format.coordinates().map_or(0, |c| c.spatial_dimensions());
    let (attributes, coordinate_attributes) = match shape {
        OutputFormat::All => (
            format.num_valid_attributes(),
            format.coordinates().map_or(0, |c| c.num_valid_attributes()),
        ),
        OutputFormat::Spatial => (2, dimensions),
        OutputFormat::SpatialTemporal => (2, dimensions + 1),
    };

    format!(
        "NUM_FILES\t{}\nNUM_ATTRIBUTES\t{}\nNUM_COORD_ATTRIBUTES\t{}\n{}",
        files, attributes, coordinate_attributes, statistics
    )
}
