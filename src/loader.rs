//! # Load Runs
//!
//! A [`TrajectoryLoader`] drives one run over an input directory:
//!
//! ```text
//! list files ──▶ read lines ──▶ segment records ──▶ transform ──▶ sink
//!                                                      │
//!                                                      ▼
//!                                              statistics engine
//! ```
//!
//! Files are processed by a small pool of scoped worker threads that pull the
//! next file index from a shared counter. A failing record is dropped and
//! logged; a failing file is skipped and counted. A file's trajectories reach
//! the statistics only after all of its records were stored. The run fails
//! only when every discovered file failed. The output-format descriptor and
//! the metadata report are written last.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::compiler::{self, FormatError};
use crate::format::DataFormat;
use crate::grammar::OutputFormat;
use crate::output::{self, METADATA_FILE, OUTPUT_FORMAT_FILE};
use crate::segment;
use crate::sink::{FileLister, RecordSink};
use crate::statistics::{StatisticsEngine, StatisticsReport};
use crate::transform::RecordTransformer;

/// Settings of a run that are not part of the TDDF description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Output shape overriding the description's `_OUTPUT_FORMAT`
    pub output_format: Option<OutputFormat>,
    /// Number of files processed concurrently
    pub workers: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            output_format: None,
            workers: 1,
        }
    }
}

/// A fatal run error.
#[derive(Debug)]
pub enum LoadError {
    Format(FormatError),
    /// The description names a coordinate system with no distance function
    UnsupportedCoordinateSystem(String),
    /// Input files could not be listed
    Discovery { root: PathBuf, source: io::Error },
    /// No file of the run could be processed
    AllFilesFailed { files: usize },
    /// A generated document could not be written
    OutputWrite { name: String, source: io::Error },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Format(e) => write!(f, "Invalid data format: {}", e),
            LoadError::UnsupportedCoordinateSystem(name) => {
                write!(f, "Unsupported coordinate system: '{}'", name)
            }
            LoadError::Discovery { root, source } => {
                write!(f, "Unable to list input files in '{}': {}", root.display(), source)
            }
            LoadError::AllFilesFailed { files: 0 } => write!(f, "No input files found"),
            LoadError::AllFilesFailed { files } => {
                write!(f, "None of the {} input files could be parsed", files)
            }
            LoadError::OutputWrite { name, source } => {
                write!(f, "Unable to save '{}': {}", name, source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Format(e) => Some(e),
            LoadError::Discovery { source, .. } => Some(source),
            LoadError::OutputWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FormatError> for LoadError {
    fn from(e: FormatError) -> Self {
        LoadError::Format(e)
    }
}

/// Why a single input file was skipped.
#[derive(Debug)]
pub enum FileError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::Read { path, source } => {
                write!(f, "Unable to read '{}': {}", path.display(), source)
            }
            FileError::Write { path, source } => {
                write!(f, "Unable to save records of '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::Read { source, .. } | FileError::Write { source, .. } => Some(source),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub files: usize,
    pub failed_files: usize,
    pub records_written: u64,
    pub records_dropped: u64,
    pub trajectories: u64,
    pub statistics: StatisticsReport,
    pub output_format_script: String,
    pub metadata_script: String,
}

/// Name of the sink document receiving the records of file number `index`.
pub fn data_file_name(index: usize) -> String {
    format!("data_file_{:05}.csv", index)
}

#[derive(Default)]
struct Tally {
    failed_files: AtomicUsize,
    records_written: AtomicU64,
    records_dropped: AtomicU64,
}

/// One load run over a compiled TDDF description.
#[derive(Debug)]
pub struct TrajectoryLoader {
    transformer: RecordTransformer,
    workers: usize,
    cancelled: AtomicBool,
}

impl TrajectoryLoader {
    pub fn new(format: DataFormat, options: LoadOptions) -> Result<Self, LoadError> {
        let system = format.coordinate_system().ok_or_else(|| {
            LoadError::UnsupportedCoordinateSystem(format.coordinate_system_name().to_string())
        })?;
        let shape = options.output_format.unwrap_or(format.output_format());
        let statistics = StatisticsEngine::for_coordinate_system(system);
        log::debug!(
            "loader: {} output, {} distance, {} workers",
            shape,
            statistics.distance_name(),
            options.workers.max(1)
        );

        Ok(TrajectoryLoader {
            transformer: RecordTransformer::new(format, shape, statistics)?,
            workers: options.workers.max(1),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Compiles `tddf` and prepares a run for it.
    pub fn from_tddf(tddf: &str, options: LoadOptions) -> Result<Self, LoadError> {
        Self::new(compiler::compile_str(tddf)?, options)
    }

    pub fn format(&self) -> &DataFormat {
        self.transformer.format()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.transformer.output_format()
    }

    /// Makes workers skip every file not yet started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Transforms every file below `root` into `sink`.
    pub fn load(
        &self,
        root: &Path,
        lister: &dyn FileLister,
        sink: &dyn RecordSink,
    ) -> Result<LoadReport, LoadError> {
        let files = lister.list_files(root).map_err(|source| LoadError::Discovery {
            root: root.to_path_buf(),
            source,
        })?;
        log::info!("{} input files found in '{}'", files.len(), root.display());

        let tally = Tally::default();
        let next = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(files.len().max(1)) {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(path) = files.get(index) else {
                            break;
                        };
                        if self.is_cancelled() {
                            log::info!("run cancelled, skipping '{}'", path.display());
                            break;
                        }
                        if let Err(e) = self.load_file(index, path, lister, sink, &tally) {
                            log::error!("File ignored: {}", e);
                            tally.failed_files.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        let failed_files = tally.failed_files.load(Ordering::SeqCst);
        if failed_files == files.len() {
            return Err(LoadError::AllFilesFailed { files: files.len() });
        }

        let statistics = self.transformer.statistics().snapshot();
        let shape = self.output_format();
        let output_format_script = output::output_format_descriptor(self.format(), shape);
        let metadata_script = output::metadata_report(self.format(), shape, files.len(), &statistics);

        let descriptor = write_document(sink, OUTPUT_FORMAT_FILE, &output_format_script);
        let metadata = write_document(sink, METADATA_FILE, &metadata_script);
        descriptor?;
        metadata?;

        Ok(LoadReport {
            files: files.len(),
            failed_files,
            records_written: tally.records_written.load(Ordering::SeqCst),
            records_dropped: tally.records_dropped.load(Ordering::SeqCst),
            trajectories: statistics.trajectories,
            statistics,
            output_format_script,
            metadata_script,
        })
    }

    fn load_file(
        &self,
        index: usize,
        path: &Path,
        lister: &dyn FileLister,
        sink: &dyn RecordSink,
        tally: &Tally,
    ) -> Result<(), FileError> {
        let lines = lister.read_lines(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = segment::segment_records(&lines, self.format());
        let total = records.len() as u64;

        let mut transformed = Vec::with_capacity(records.len());
        let mut samples = Vec::with_capacity(records.len());
        for record in &records {
            match self.transformer.prepare(record) {
                Ok(t) => {
                    transformed.push(t.line);
                    samples.push(t.sample);
                }
                Err(e) => log::warn!("Record ignored: {} ({})", e, record),
            }
        }

        let written = sink
            .write_records(&data_file_name(index), &mut transformed.into_iter())
            .map_err(|source| FileError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        self.transformer.statistics().add_samples(&samples);

        tally.records_written.fetch_add(written, Ordering::SeqCst);
        tally
            .records_dropped
            .fetch_add(total.saturating_sub(written), Ordering::SeqCst);
        log::info!(
            "'{}': {} of {} records written",
            path.display(),
            written,
            total
        );
        Ok(())
    }
}

fn write_document(sink: &dyn RecordSink, name: &str, content: &str) -> Result<(), LoadError> {
    sink.write_text(name, content).map_err(|source| {
        log::error!("Unable to save '{}': {}", name, source);
        LoadError::OutputWrite {
            name: name.to_string(),
            source,
        }
    })
}
