// tests/lexer_tests.rs

use tddf_loader::grammar::{LexicalClass, Token};
use tddf_loader::lexer::{self, LexError, Lexer};

fn classes(tokens: &[Token]) -> Vec<LexicalClass> {
    tokens.iter().map(|t| t.class).collect()
}

// ============================================================================
// Token Classification
// ============================================================================

#[test]
fn test_keyword_classes() {
    let test_cases = vec![
        ("_ID", LexicalClass::Attribute),
        ("_COORDINATES", LexicalClass::Attribute),
        ("_OUTPUT_FORMAT", LexicalClass::Command),
        ("_IGNORE_LINES", LexicalClass::Command),
        ("DECIMAL", LexicalClass::Type),
        ("STRING", LexicalClass::Type),
        ("DELTADECIMAL", LexicalClass::DeltaType),
        ("DELTAINTEGER", LexicalClass::DeltaType),
        ("LN", LexicalClass::Delimiter),
        ("EOF", LexicalClass::Delimiter),
        ("CARTESIAN", LexicalClass::CoordinateSystem),
        ("SPATIAL_TEMPORAL", LexicalClass::Format),
        ("MONGODB", LexicalClass::DatabaseName),
    ];

    for (input, expected) in test_cases {
        assert_eq!(lexer::classify(input, false).class, expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_keywords_ignore_case() {
    assert_eq!(lexer::classify("decimal", false).class, LexicalClass::Type);
    assert_eq!(lexer::classify("_Output_Format", true).class, LexicalClass::Command);
    assert_eq!(lexer::classify("geographic", false).class, LexicalClass::CoordinateSystem);
}

#[test]
fn test_structural_overrides() {
    assert_eq!(
        lexer::classify("ARRAY(_X DECIMAL ,)", false).class,
        LexicalClass::ArrayType
    );
    assert_eq!(
        lexer::classify("array(_X DECIMAL ,)", false).class,
        LexicalClass::ArrayType
    );
    assert_eq!(
        lexer::classify("DATETIME[\"yyyy\"]", false).class,
        LexicalClass::DateType
    );
    assert_eq!(lexer::classify(";", false).class, LexicalClass::Delimiter);
    assert_eq!(lexer::classify("|", true).class, LexicalClass::Delimiter);
}

#[test]
fn test_unknown_words_depend_on_position() {
    assert_eq!(lexer::classify("speed", true).class, LexicalClass::Attribute);
    assert_eq!(lexer::classify("speed", false).class, LexicalClass::GenericString);
    assert_eq!(lexer::classify("traj", false).class, LexicalClass::GenericString);
}

// ============================================================================
// Whole Descriptions
// ============================================================================

#[test]
fn test_analyze_file_appends_end_of_line() {
    let tokens = lexer::analyze_file(&["_ID STRING ;", "_OUTPUT_FORMAT ALL"]).unwrap();
    assert_eq!(
        classes(&tokens),
        vec![
            LexicalClass::Attribute,
            LexicalClass::Type,
            LexicalClass::Delimiter,
            LexicalClass::EndOfLine,
            LexicalClass::Command,
            LexicalClass::Format,
            LexicalClass::EndOfLine,
        ]
    );
    assert_eq!(tokens[3].value, "end");
}

#[test]
fn test_tabs_and_spaces_separate_tokens() {
    let tokens = lexer::analyze_file(&["_ID\t\tSTRING   ;"]).unwrap();
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["_ID", "STRING", ";", "end"]);
}

#[test]
fn test_array_declaration_is_one_token() {
    let tokens =
        lexer::analyze_file(&["_COORDINATES ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,) ;"])
            .unwrap();
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[1].value, "ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)");
    assert_eq!(tokens[1].class, LexicalClass::ArrayType);
    assert_eq!(tokens[2].value, ";");
}

#[test]
fn test_multi_line_array_is_joined() {
    let lexer = Lexer::new(&[
        "_COORDINATES ARRAY(",
        "  _X DECIMAL ,",
        "",
        "  _Y DECIMAL ,",
        "  _TIME INTEGER ,",
        ") ;",
    ])
    .unwrap();
    assert_eq!(lexer.lines().len(), 1);

    let tokens = lexer.tokenize();
    assert_eq!(tokens[1].class, LexicalClass::ArrayType);
    assert_eq!(tokens[2].value, ";");
}

#[test]
fn test_date_pattern_whitespace_is_bonded() {
    let tokens = lexer::analyze_file(&["_X DATETIME[\"yyyy-MM-dd HH:mm\"] ,"]).unwrap();
    assert_eq!(tokens[1].class, LexicalClass::DateType);
    assert_eq!(tokens[1].value, "DATETIME[\"yyyy-MM-dd\u{1F}HH:mm\"]");
    assert_eq!(tokens[2].value, ",");
}

#[test]
fn test_comments_and_blank_lines_are_dropped() {
    let lexer = Lexer::new(&["# header", "", "   ", "_ID STRING ;", "  # indented"]).unwrap();
    assert_eq!(lexer.lines(), &["_ID STRING ;".to_string()]);
}

#[test]
fn test_empty_input_is_invalid() {
    let empty: [&str; 0] = [];
    assert_eq!(Lexer::new(&empty).err(), Some(LexError::InvalidInput));
    assert_eq!(
        Lexer::new(&["# only a comment", ""]).err(),
        Some(LexError::InvalidInput)
    );
}

// ============================================================================
// Array Declarations
// ============================================================================

#[test]
fn test_analyze_array_triples() {
    let tokens = lexer::analyze_array("ARRAY(_X DECIMAL , _Y DECIMAL ; _TIME INTEGER LN)");
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(
        values,
        vec!["_X", "DECIMAL", ",", "_Y", "DECIMAL", ";", "_TIME", "INTEGER", "LN"]
    );
    assert_eq!(tokens[0].class, LexicalClass::Attribute);
    assert_eq!(tokens[3].class, LexicalClass::Attribute);
    assert_eq!(tokens[8].class, LexicalClass::Delimiter);
}

#[test]
fn test_array_with_parenthesis_delimiter() {
    let tokens = lexer::analyze_file(&["_COORDINATES ARRAY(_X DECIMAL ) _Y DECIMAL ,) ;"]).unwrap();
    assert_eq!(tokens[1].value, "ARRAY(_X DECIMAL ) _Y DECIMAL ,)");

    let inner = lexer::analyze_array(&tokens[1].value);
    assert_eq!(inner[2].value, ")");
    assert_eq!(inner[2].class, LexicalClass::Delimiter);
}

#[test]
fn test_array_body() {
    assert_eq!(lexer::array_body("ARRAY(_X DECIMAL ,)"), "_X DECIMAL ,");
    assert_eq!(lexer::array_body("  array( _X DECIMAL , )  "), "_X DECIMAL ,");
}
