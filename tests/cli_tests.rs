// tests/cli_tests.rs

#![cfg(feature = "cli")]

use tddf_loader::cli::{
    self, CheckOptions, CheckResult, CliError, DocTopic, LoadCommand, execute_check, execute_load,
};
use tddf_loader::grammar::OutputFormat;

const CONFLICTING_ID: &str = "\
_ID             STRING      ;
_COORDINATES    ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)    ;
_AUTO_ID        ignored
";

const VALID: &str = "\
_ID             STRING      ;
_COORDINATES    ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)    ;
_DECIMAL_PREC   0
_IGNORE_LINES   [1]
";

// ============================================================================
// Check Command
// ============================================================================

#[test]
fn test_check_valid_description() {
    let result = execute_check(&CheckOptions {
        input: Some(VALID.into()),
        json: false,
    })
    .unwrap();
    match result {
        CheckResult::Valid(format) => assert_eq!(format.num_valid_attributes(), 2),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_check_renders_json() {
    let result = execute_check(&CheckOptions {
        input: Some(VALID.into()),
        json: true,
    })
    .unwrap();
    let CheckResult::Json(value) = result else {
        panic!("expected JSON output");
    };
    assert_eq!(value["id_index"], 0);
    assert_eq!(value["coordinates_index"], 1);
    assert_eq!(value["decimal_precision"], 0);
    assert_eq!(value["output_format"], "ALL");
    assert_eq!(value["records_delimiter"], "LN");
    assert_eq!(value["ignored_lines"], serde_json::json!([1]));
    assert_eq!(value["coordinates"]["time_index"], 2);
    assert_eq!(value["attributes"][0]["name"], "_ID");
    assert_eq!(value["attributes"][0]["delimiter"], ";");
}

#[test]
fn test_check_rejects_invalid_description() {
    let result = execute_check(&CheckOptions {
        input: Some(CONFLICTING_ID.into()),
        json: false,
    });
    assert!(matches!(result, Err(CliError::Format(_))));
}

#[test]
fn test_check_without_input() {
    for input in [None, Some("   \n".to_string())] {
        let result = execute_check(&CheckOptions { input, json: false });
        assert!(matches!(result, Err(CliError::NoInput)));
    }
}

// ============================================================================
// Load Command
// ============================================================================

#[test]
fn test_load_command_writes_output() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("input");
    let output = base.path().join("output");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(base.path().join("format.tddf"), VALID).unwrap();
    std::fs::write(input.join("a.csv"), "header\nt1;0,1,10,2,3,20\n").unwrap();

    let report = execute_load(&LoadCommand {
        format: base.path().join("format.tddf"),
        input: input.clone(),
        output: output.clone(),
        output_format: Some(OutputFormat::Spatial),
        workers: 2,
    })
    .unwrap();
    assert_eq!(report.records_written, 1);
    assert_eq!(
        std::fs::read_to_string(output.join("data_file_00000.csv")).unwrap(),
        "t1;0,1,2,2\n"
    );

    let json = cli::report_to_json(&report);
    assert_eq!(json["files"], 1);
    assert_eq!(json["statistics"]["NUM_POINTS"], "2");
}

#[test]
fn test_load_command_missing_description() {
    let result = execute_load(&LoadCommand {
        format: "/nonexistent/format.tddf".into(),
        input: "/nonexistent/input".into(),
        output: "/nonexistent/output".into(),
        output_format: None,
        workers: 1,
    });
    assert!(matches!(result, Err(CliError::Io(_))));
}

// ============================================================================
// Documentation
// ============================================================================

#[test]
fn test_doc_topics() {
    assert_eq!(DocTopic::from_name("Types"), Some(DocTopic::Types));
    assert_eq!(DocTopic::from_name("output-format"), Some(DocTopic::Output));
    assert_eq!(DocTopic::from_name("queries"), None);

    for topic in ["attributes", "types", "commands", "delimiters", "output"] {
        assert!(!cli::get_doc_topic(topic).unwrap().is_empty());
    }
    assert!(matches!(
        cli::get_doc_topic("queries"),
        Err(CliError::UnknownTopic(t)) if t == "queries"
    ));
    assert!(cli::get_docs_overview().contains("tddf doc <topic>"));
}
