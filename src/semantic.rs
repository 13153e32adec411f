//! Semantic analysis: cross-line constraints of a TDDF description.
//!
//! Every check runs, so one pass reports every violation.

use crate::format::ArrayFormat;
use crate::format::data::inverted_intervals;
use crate::grammar::{Keyword, LexicalClass, Token};
use crate::syntax::declaration_lines;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Neither `_ID` nor `_AUTO_ID`
    MissingId,
    /// Both `_ID` and `_AUTO_ID`
    IdAndAutoId,
    MissingCoordinates,
    /// No `_X` or `_LON` in the coordinates array
    MissingX,
    /// No `_Y` or `_LAT` in the coordinates array
    MissingY,
    /// No `_TIME` in the coordinates array
    MissingTime,
    /// Two attributes with the same name, ignoring case
    DuplicateAttribute(String),
    /// An `_IGNORE_LINES` interval `a-b` with `a > b`
    InvalidInterval { begin: usize, end: usize },
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticError::MissingId => write!(
                f,
                "Data format must contain either the '_ID' attribute or the '_AUTO_ID' command"
            ),
            SemanticError::IdAndAutoId => write!(
                f,
                "Attribute '_ID' and command '_AUTO_ID' cannot be declared together"
            ),
            SemanticError::MissingCoordinates => {
                write!(f, "Data format must contain the '_COORDINATES' attribute")
            }
            SemanticError::MissingX => write!(
                f,
                "Coordinates array must contain either the '_X' or the '_LON' attribute"
            ),
            SemanticError::MissingY => write!(
                f,
                "Coordinates array must contain either the '_Y' or the '_LAT' attribute"
            ),
            SemanticError::MissingTime => {
                write!(f, "Coordinates array must contain the '_TIME' attribute")
            }
            SemanticError::DuplicateAttribute(name) => {
                write!(f, "Attribute '{}' declaration must be unique", name)
            }
            SemanticError::InvalidInterval { begin, end } => write!(
                f,
                "Ignore lines interval '{}-{}' must not end before it begins",
                begin, end
            ),
        }
    }
}

impl std::error::Error for SemanticError {}

/// Facts gathered from one pass over the tokens.
#[derive(Debug, Default)]
struct Declarations<'a> {
    attribute_names: Vec<&'a str>,
    coordinates_type: Option<&'a str>,
    ignore_lines: Option<&'a str>,
    auto_id: Option<&'a str>,
}

impl<'a> Declarations<'a> {
    fn collect(tokens: &'a [Token]) -> Self {
        let mut decl = Declarations::default();
        for line in declaration_lines(tokens) {
            let name = line[0].value.as_str();
            let value = line.get(1).map(|t| t.value.as_str());

            if line[0].is(LexicalClass::Command) {
                match Keyword::lookup(name) {
                    Some(Keyword::IgnoreLines) => decl.ignore_lines = value,
                    Some(Keyword::AutoId) => decl.auto_id = value,
                    _ => {}
                }
            } else {
                decl.attribute_names.push(name);
                if Keyword::Coordinates.matches(name) {
                    decl.coordinates_type = value;
                }
            }
        }
        decl
    }
}

/// Runs every semantic check over `tokens`.
pub fn analyze(tokens: &[Token]) -> Result<(), Vec<SemanticError>> {
    let decl = Declarations::collect(tokens);
    let mut errors = Vec::new();

    check_identity(&decl, &mut errors);
    check_coordinates(&decl, &mut errors);
    check_uniqueness(&decl, &mut errors);
    check_ignored_lines(&decl, &mut errors);

    for e in &errors {
        log::error!("{}", e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_identity(decl: &Declarations<'_>, errors: &mut Vec<SemanticError>) {
    let has_id = decl
        .attribute_names
        .iter()
        .any(|name| Keyword::Id.matches(name));
    match (has_id, decl.auto_id.is_some()) {
        (false, false) => errors.push(SemanticError::MissingId),
        (true, true) => errors.push(SemanticError::IdAndAutoId),
        _ => {}
    }
}

fn check_coordinates(decl: &Declarations<'_>, errors: &mut Vec<SemanticError>) {
    let Some(declaration) = decl.coordinates_type else {
        errors.push(SemanticError::MissingCoordinates);
        return;
    };
    let array = ArrayFormat::from_declaration(declaration);
    if array.x_index().is_none() {
        errors.push(SemanticError::MissingX);
    }
    if array.y_index().is_none() {
        errors.push(SemanticError::MissingY);
    }
    if array.time_index().is_none() {
        errors.push(SemanticError::MissingTime);
    }
}

fn check_uniqueness(decl: &Declarations<'_>, errors: &mut Vec<SemanticError>) {
    let names = &decl.attribute_names;
    for (i, a) in names.iter().enumerate() {
        if names[..i].iter().any(|b| a.eq_ignore_ascii_case(b)) {
            continue;
        }
        if names[i + 1..].iter().any(|b| a.eq_ignore_ascii_case(b)) {
            errors.push(SemanticError::DuplicateAttribute(a.to_string()));
        }
    }
}

fn check_ignored_lines(decl: &Declarations<'_>, errors: &mut Vec<SemanticError>) {
    if let Some(value) = decl.ignore_lines {
        errors.extend(
            inverted_intervals(value)
                .into_iter()
                .map(|(begin, end)| SemanticError::InvalidInterval { begin, end }),
        );
    }
}
