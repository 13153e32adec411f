//! Storage collaborators of a load run: where input files come from and where
//! transformed records go.
//!
//! The loader only talks to the two traits below. [`LocalFileLister`] and
//! [`LocalDirectorySink`] are the filesystem implementations used by the CLI.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Destination of transformed records and generated descriptor files.
pub trait RecordSink: Send + Sync {
    /// Persists the records of one input file under `name`, skipping empty
    /// records. Returns the number of records written. On error nothing is
    /// left under `name`.
    fn write_records(&self, name: &str, records: &mut dyn Iterator<Item = String>) -> io::Result<u64>;

    /// Persists a short text document under `name`.
    fn write_text(&self, name: &str, content: &str) -> io::Result<()>;
}

/// Source of raw input files.
pub trait FileLister: Send + Sync {
    /// Every regular file below `root`, recursively, in a stable order.
    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Lists and reads files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileLister;

impl FileLister for LocalFileLister {
    /// A root that is itself a file is listed alone.
    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        BufReader::new(File::open(path)?).lines().collect()
    }
}

/// Writes every document as a file inside one output directory.
#[derive(Debug, Clone)]
pub struct LocalDirectorySink {
    root: PathBuf,
}

impl LocalDirectorySink {
    /// Creates the directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(LocalDirectorySink { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RecordSink for LocalDirectorySink {
    /// Records go to `<name>.part` first, renamed to `name` once complete.
    fn write_records(&self, name: &str, records: &mut dyn Iterator<Item = String>) -> io::Result<u64> {
        let partial = self.root.join(format!("{}.part", name));
        let result = write_lines(&partial, records)
            .and_then(|written| fs::rename(&partial, self.root.join(name)).map(|_| written));
        if result.is_err() {
            if let Err(e) = fs::remove_file(&partial) {
                log::debug!("unable to remove '{}': {}", partial.display(), e);
            }
        }
        result
    }

    fn write_text(&self, name: &str, content: &str) -> io::Result<()> {
        fs::write(self.root.join(name), content)
    }
}

fn write_lines(path: &Path, records: &mut dyn Iterator<Item = String>) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut written = 0;
    for record in records.filter(|r| !r.is_empty()) {
        writeln!(out, "{}", record)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}
