//! Validate a TDDF description

use super::{CliError, format_to_json};
use crate::compiler;
use crate::format::DataFormat;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// TDDF description text
    pub input: Option<String>,
    /// Render the compiled model as JSON
    pub json: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The description is valid
    Valid(DataFormat),
    /// The description is valid, rendered as JSON
    Json(serde_json::Value),
}

/// Compile a TDDF description and report the outcome
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let text = options.input.as_deref().ok_or(CliError::NoInput)?;
    if text.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    let format = compiler::compile_str(text)?;
    if options.json {
        return Ok(CheckResult::Json(format_to_json(&format)));
    }
    Ok(CheckResult::Valid(format))
}
