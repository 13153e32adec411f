//! CLI support for tddf-loader
//!
//! Provides programmatic access to the `tddf` commands so they can be
//! embedded in other tools.

mod check;
mod convert;
mod docs;
mod load;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{format_to_json, report_to_json, statistics_to_json};
pub use docs::{DocTopic, get_doc_topic, get_docs_overview};
pub use load::{LoadCommand, execute_load};

use std::io;

use crate::compiler::FormatError;
use crate::loader::LoadError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// The TDDF description was rejected
    Format(FormatError),
    /// The load run failed
    Load(LoadError),
    /// JSON rendering error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No TDDF description provided
    NoInput,
    /// Unknown documentation topic
    UnknownTopic(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Format(e) => write!(f, "{}", e),
            CliError::Load(e) => write!(f, "Load error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(
                f,
                "No data format provided. Pass a TDDF file or pipe one to stdin."
            ),
            CliError::UnknownTopic(t) => {
                write!(f, "Unknown topic: '{}'\nRun 'tddf docs' to see available topics.", t)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Format(e) => Some(e),
            CliError::Load(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for CliError {
    fn from(e: FormatError) -> Self {
        CliError::Format(e)
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::Load(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
