//! Run a load over an input directory

use std::fs;
use std::path::PathBuf;

use super::CliError;
use crate::grammar::OutputFormat;
use crate::loader::{LoadOptions, LoadReport, TrajectoryLoader};
use crate::sink::{LocalDirectorySink, LocalFileLister};

/// Options for the load command
#[derive(Debug, Clone)]
pub struct LoadCommand {
    /// TDDF description file
    pub format: PathBuf,
    /// Input file or directory
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Output shape overriding the description's
    pub output_format: Option<OutputFormat>,
    /// Number of files processed concurrently
    pub workers: usize,
}

/// Compile the description and load every input file into the output directory
pub fn execute_load(command: &LoadCommand) -> Result<LoadReport, CliError> {
    let tddf = fs::read_to_string(&command.format)?;
    let options = LoadOptions {
        output_format: command.output_format,
        workers: command.workers,
    };
    let loader = TrajectoryLoader::from_tddf(&tddf, options)?;

    let sink = LocalDirectorySink::create(&command.output)?;
    let report = loader.load(&command.input, &LocalFileLister, &sink)?;
    log::info!(
        "{} records written to '{}'",
        report.records_written,
        sink.root().display()
    );
    Ok(report)
}
