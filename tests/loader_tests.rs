// tests/loader_tests.rs

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tddf_loader::grammar::OutputFormat;
use tddf_loader::loader::{LoadError, LoadOptions, TrajectoryLoader, data_file_name};
use tddf_loader::output::{METADATA_FILE, OUTPUT_FORMAT_FILE};
use tddf_loader::sink::{FileLister, LocalDirectorySink, LocalFileLister, RecordSink};

const SCENARIO_A: &str = "\
_ID             STRING      ;
_COORDINATES    ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)    ;
_OUTPUT_FORMAT  SPATIAL_TEMPORAL
_DECIMAL_PREC   0
";

/// Files kept in memory. A `None` entry fails to read.
#[derive(Default)]
struct MemoryLister {
    files: BTreeMap<PathBuf, Option<Vec<String>>>,
}

impl MemoryLister {
    fn with(mut self, path: &str, lines: &[&str]) -> Self {
        self.files.insert(
            PathBuf::from(path),
            Some(lines.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    fn unreadable(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path), None);
        self
    }
}

impl FileLister for MemoryLister {
    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self.files.keys().filter(|p| p.starts_with(root)).cloned().collect())
    }

    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        match self.files.get(path) {
            Some(Some(lines)) => Ok(lines.clone()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "unreadable")),
        }
    }
}

#[derive(Default)]
struct MemorySink {
    records: Mutex<BTreeMap<String, Vec<String>>>,
    documents: Mutex<BTreeMap<String, String>>,
    reject_documents: bool,
    /// Fails the named document once this many records were consumed
    fail_after: Option<(String, usize)>,
}

impl MemorySink {
    fn records(&self, name: &str) -> Vec<String> {
        self.records.lock().unwrap().get(name).cloned().unwrap_or_default()
    }

    fn document(&self, name: &str) -> Option<String> {
        self.documents.lock().unwrap().get(name).cloned()
    }

    fn touched(&self) -> bool {
        !self.records.lock().unwrap().is_empty() || !self.documents.lock().unwrap().is_empty()
    }
}

impl RecordSink for MemorySink {
    fn write_records(&self, name: &str, records: &mut dyn Iterator<Item = String>) -> io::Result<u64> {
        let mut kept = Vec::new();
        for record in records.filter(|r| !r.is_empty()) {
            if let Some((failing, limit)) = &self.fail_after {
                if failing == name && kept.len() == *limit {
                    return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
                }
            }
            kept.push(record);
        }
        let count = kept.len() as u64;
        self.records.lock().unwrap().insert(name.to_string(), kept);
        Ok(count)
    }

    fn write_text(&self, name: &str, content: &str) -> io::Result<()> {
        if self.reject_documents {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_string());
        Ok(())
    }
}

fn scenario_lister() -> MemoryLister {
    MemoryLister::default()
        .with(
            "in/a.csv",
            &["t1;0,1,10,2,3,20,4,5,30", "t2;5,5,10,6,6,20"],
        )
        .with("in/b.csv", &["t3;1,1,10", "t4;oops,1,10"])
}

fn loader(options: LoadOptions) -> TrajectoryLoader {
    TrajectoryLoader::from_tddf(SCENARIO_A, options).expect("loader should build")
}

// ============================================================================
// Successful Runs
// ============================================================================

#[test]
fn test_end_to_end_run() {
    let sink = MemorySink::default();
    let report = loader(LoadOptions::default())
        .load(Path::new("in"), &scenario_lister(), &sink)
        .unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.failed_files, 0);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.records_dropped, 1);
    assert_eq!(report.trajectories, 3);
    assert_eq!(report.statistics.points, 6);

    assert_eq!(
        sink.records("data_file_00000.csv"),
        vec!["t1;0,1,10,2,2,10,2,2,10", "t2;5,5,10,1,1,10"]
    );
    assert_eq!(sink.records("data_file_00001.csv"), vec!["t3;1,1,10"]);
}

#[test]
fn test_generated_documents() {
    let sink = MemorySink::default();
    let report = loader(LoadOptions::default())
        .load(Path::new("in"), &scenario_lister(), &sink)
        .unwrap();

    let descriptor = sink.document(OUTPUT_FORMAT_FILE).unwrap();
    assert_eq!(descriptor, report.output_format_script);
    assert_eq!(
        descriptor,
        "_OUTPUT_FORMAT\tSPATIAL_TEMPORAL\n\
         _COORD_SYSTEM\tCARTESIAN\n\
         _DECIMAL_PREC\t0\n\
         _SPATIAL_DIM\t2\n\
         _ID\tSTRING\n\
         _COORDINATES\tARRAY(_X DECIMAL _Y DECIMAL _TIME INTEGER)"
    );

    let metadata = sink.document(METADATA_FILE).unwrap();
    assert_eq!(metadata, report.metadata_script);
    assert!(metadata.starts_with(
        "NUM_FILES\t2\nNUM_ATTRIBUTES\t2\nNUM_COORD_ATTRIBUTES\t3\nNUM_TRAJECTORIES\t3\nNUM_POINTS\t6\n"
    ));
    assert!(metadata.ends_with("MAX_T\t30"));
}

#[test]
fn test_output_format_override() {
    let sink = MemorySink::default();
    let options = LoadOptions {
        output_format: Some(OutputFormat::Spatial),
        workers: 1,
    };
    let run = loader(options);
    assert_eq!(run.output_format(), OutputFormat::Spatial);
    run.load(Path::new("in"), &scenario_lister(), &sink).unwrap();
    assert_eq!(sink.records("data_file_00001.csv"), vec!["t3;1,1"]);
    assert!(sink
        .document(OUTPUT_FORMAT_FILE)
        .unwrap()
        .starts_with("_OUTPUT_FORMAT\tSPATIAL\n"));
}

#[test]
fn test_workers_agree_with_single_thread() {
    let mut lister = MemoryLister::default();
    for i in 0..12 {
        let record = format!("t{};{},0,10,{},1,20,{},2,40", i, i, i + 3, i + 6);
        lister = lister.with(&format!("in/{:02}.csv", i), &[record.as_str()]);
    }

    let single = loader(LoadOptions::default())
        .load(Path::new("in"), &lister, &MemorySink::default())
        .unwrap();
    let pooled_sink = MemorySink::default();
    let pooled = loader(LoadOptions {
        output_format: None,
        workers: 4,
    })
    .load(Path::new("in"), &lister, &pooled_sink)
    .unwrap();

    assert_eq!(pooled.trajectories, 12);
    assert_eq!(pooled.records_written, single.records_written);
    assert_eq!(pooled.statistics.points, single.statistics.points);
    assert_eq!(pooled.statistics.coverage, single.statistics.coverage);
    assert!((pooled.statistics.length.mean - single.statistics.length.mean).abs() < 1e-9);
    assert_eq!(pooled_sink.records(&data_file_name(11)).len(), 1);
}

#[test]
fn test_data_file_names() {
    assert_eq!(data_file_name(0), "data_file_00000.csv");
    assert_eq!(data_file_name(42), "data_file_00042.csv");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failing_file_is_skipped() {
    let lister = scenario_lister().unreadable("in/c.csv");
    let sink = MemorySink::default();
    let report = loader(LoadOptions::default())
        .load(Path::new("in"), &lister, &sink)
        .unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.trajectories, 3);
    assert!(sink.document(METADATA_FILE).unwrap().starts_with("NUM_FILES\t3\n"));
}

#[test]
fn test_sink_failure_mid_file_discards_its_trajectories() {
    let sink = MemorySink {
        fail_after: Some((data_file_name(0), 1)),
        ..MemorySink::default()
    };
    let report = loader(LoadOptions::default())
        .load(Path::new("in"), &scenario_lister(), &sink)
        .unwrap();

    assert_eq!(report.failed_files, 1);
    assert_eq!(report.records_written, 1);
    assert_eq!(report.trajectories, 1);
    assert_eq!(report.statistics.points, 1);
    assert!(sink.records(&data_file_name(0)).is_empty());
    assert_eq!(sink.records(&data_file_name(1)), vec!["t3;1,1,10"]);
    assert!(sink.document(METADATA_FILE).unwrap().contains("NUM_TRAJECTORIES\t1\n"));
}

#[test]
fn test_all_files_failing() {
    let lister = MemoryLister::default()
        .unreadable("in/a.csv")
        .unreadable("in/b.csv");
    let sink = MemorySink::default();
    let result = loader(LoadOptions::default()).load(Path::new("in"), &lister, &sink);
    assert!(matches!(result, Err(LoadError::AllFilesFailed { files: 2 })));
    assert!(sink.document(OUTPUT_FORMAT_FILE).is_none());
}

#[test]
fn test_no_input_files() {
    let result = loader(LoadOptions::default()).load(
        Path::new("elsewhere"),
        &scenario_lister(),
        &MemorySink::default(),
    );
    match result {
        Err(e @ LoadError::AllFilesFailed { files: 0 }) => {
            assert_eq!(e.to_string(), "No input files found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_invalid_format_fails_before_io() {
    let result = TrajectoryLoader::from_tddf("_COORDINATES STRING ;", LoadOptions::default());
    assert!(matches!(result, Err(LoadError::Format(_))));

    let result = TrajectoryLoader::from_tddf(
        "_ID STRING ;\n_AUTO_ID 1\n_COORDINATES ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,) ;",
        LoadOptions::default(),
    );
    assert!(matches!(result, Err(LoadError::Format(_))));
}

#[test]
fn test_document_write_failure() {
    let sink = MemorySink {
        reject_documents: true,
        ..MemorySink::default()
    };
    let result = loader(LoadOptions::default()).load(Path::new("in"), &scenario_lister(), &sink);
    match result {
        Err(LoadError::OutputWrite { name, .. }) => assert_eq!(name, OUTPUT_FORMAT_FILE),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_cancelled_run_skips_files() {
    let run = loader(LoadOptions::default());
    run.cancel();
    assert!(run.is_cancelled());

    let sink = MemorySink::default();
    let report = run.load(Path::new("in"), &scenario_lister(), &sink).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.failed_files, 0);
    assert_eq!(report.trajectories, 0);
    assert!(sink.records("data_file_00000.csv").is_empty());
    assert!(sink.document(METADATA_FILE).is_some());
}

#[test]
fn test_untouched_sink_on_discovery_error() {
    struct BrokenLister;

    impl FileLister for BrokenLister {
        fn list_files(&self, _root: &Path) -> io::Result<Vec<PathBuf>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"))
        }

        fn read_lines(&self, _path: &Path) -> io::Result<Vec<String>> {
            unreachable!()
        }
    }

    let sink = MemorySink::default();
    let result = loader(LoadOptions::default()).load(Path::new("in"), &BrokenLister, &sink);
    assert!(matches!(result, Err(LoadError::Discovery { .. })));
    assert!(!sink.touched());
}

// ============================================================================
// Local Filesystem
// ============================================================================

#[test]
fn test_local_directory_run() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("input");
    let output = base.path().join("output");
    std::fs::create_dir_all(input.join("nested")).unwrap();
    std::fs::write(input.join("a.csv"), "t1;0,1,10,2,3,20,4,5,30\n").unwrap();
    std::fs::write(input.join("nested").join("b.csv"), "t2;5,5,10,6,6,20\n\n").unwrap();

    let sink = LocalDirectorySink::create(&output).unwrap();
    assert_eq!(sink.root(), output.as_path());
    let report = loader(LoadOptions::default())
        .load(&input, &LocalFileLister, &sink)
        .unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.records_written, 2);

    let first = std::fs::read_to_string(output.join("data_file_00000.csv")).unwrap();
    assert_eq!(first, "t1;0,1,10,2,2,10,2,2,10\n");
    let second = std::fs::read_to_string(output.join("data_file_00001.csv")).unwrap();
    assert_eq!(second, "t2;5,5,10,1,1,10\n");
    assert!(output.join(OUTPUT_FORMAT_FILE).is_file());
    assert!(output.join(METADATA_FILE).is_file());

    let single = LocalFileLister.list_files(&input.join("a.csv")).unwrap();
    assert_eq!(single, vec![input.join("a.csv")]);
}

#[test]
fn test_local_write_failure_leaves_no_partial_file() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("input");
    let output = base.path().join("output");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("a.csv"), "t1;0,1,10,2,3,20\n").unwrap();
    std::fs::write(input.join("b.csv"), "t2;5,5,10\n").unwrap();
    // a directory in the way of the first data file
    std::fs::create_dir_all(output.join(data_file_name(0))).unwrap();

    let sink = LocalDirectorySink::create(&output).unwrap();
    let report = loader(LoadOptions::default())
        .load(&input, &LocalFileLister, &sink)
        .unwrap();
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.trajectories, 1);
    assert_eq!(report.statistics.points, 1);

    assert!(output.join(data_file_name(0)).is_dir());
    assert!(!output.join(format!("{}.part", data_file_name(0))).exists());
    assert_eq!(
        std::fs::read_to_string(output.join(data_file_name(1))).unwrap(),
        "t2;5,5,10\n"
    );
}
