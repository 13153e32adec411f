pub mod compiler;
pub mod datetime;
pub mod delta;
pub mod distance;
pub mod format;
pub mod grammar;
pub mod lexer;
pub mod loader;
pub mod output;
pub mod segment;
pub mod semantic;
pub mod sink;
pub mod statistics;
pub mod syntax;
pub mod transform;

#[cfg(feature = "cli")]
pub mod cli;

pub use compiler::{FormatError, compile, compile_str};
pub use format::{ArrayFormat, DataFormat, Format, RecordDelimiter};
pub use grammar::{CoordinateSystem, Keyword, LexicalClass, OutputFormat, Token};
pub use lexer::{LexError, Lexer};
pub use loader::{FileError, LoadError, LoadOptions, LoadReport, TrajectoryLoader};
pub use semantic::SemanticError;
pub use sink::{FileLister, LocalDirectorySink, LocalFileLister, RecordSink};
pub use statistics::{StatisticsEngine, StatisticsReport, TrajectorySample};
pub use syntax::SyntaxError;
pub use transform::{RecordError, RecordTransformer, TransformedRecord};
