//! The three-stage gate from TDDF text to a [`DataFormat`].

use crate::format::DataFormat;
use crate::lexer::{self, LexError};
use crate::semantic::{self, SemanticError};
use crate::syntax::{self, SyntaxError};

/// Rejection of a TDDF description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    Lexical(LexError),
    Syntax(SyntaxError),
    /// Every semantic violation found
    Semantic(Vec<SemanticError>),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Lexical(e) => write!(f, "Lexical error: {}", e),
            FormatError::Syntax(e) => write!(f, "Syntax error: {}", e),
            FormatError::Semantic(errors) => {
                write!(f, "Semantic error")?;
                if errors.len() > 1 {
                    write!(f, "s ({})", errors.len())?;
                }
                for e in errors {
                    write!(f, "\n  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Lexical(e) => Some(e),
            FormatError::Syntax(e) => Some(e),
            FormatError::Semantic(errors) => errors
                .first()
                .map(|e| e as &(dyn std::error::Error + 'static)),
        }
    }
}

impl From<LexError> for FormatError {
    fn from(e: LexError) -> Self {
        FormatError::Lexical(e)
    }
}

impl From<SyntaxError> for FormatError {
    fn from(e: SyntaxError) -> Self {
        FormatError::Syntax(e)
    }
}

impl From<Vec<SemanticError>> for FormatError {
    fn from(errors: Vec<SemanticError>) -> Self {
        FormatError::Semantic(errors)
    }
}

/// Compiles the lines of a TDDF description.
///
/// Syntax and semantic analysis both run so that every problem gets logged;
/// a syntax error wins over semantic errors in the returned value.
pub fn compile<S: AsRef<str>>(lines: &[S]) -> Result<DataFormat, FormatError> {
    let tokens = lexer::analyze_file(lines)?;

    let syntax = syntax::analyze(&tokens);
    let semantic = semantic::analyze(&tokens);
    syntax?;
    semantic?;

    let format = DataFormat::from_tokens(&tokens);
    log::debug!(
        "compiled format: {} attributes, output {}, precision {}",
        format.num_attributes(),
        format.output_format(),
        format.decimal_precision()
    );
    Ok(format)
}

/// Compiles a TDDF description held in one string.
pub fn compile_str(text: &str) -> Result<DataFormat, FormatError> {
    let lines: Vec<&str> = text.lines().collect();
    compile(&lines)
}
