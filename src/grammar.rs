//! # TDDF Grammar Vocabulary
//!
//! This module defines the vocabulary of the Trajectory Data Description Format
//! (TDDF): the tokens produced by the lexical analyzer, the lexical classes they
//! are tagged with, and the static keyword table that maps every reserved word to
//! its class.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - `Token` and `LexicalClass`
//! - **[keywords]** - reserved words, output shapes, coordinate systems and type helpers
//!
//! ## Quick Start
//!
//! ```text
//! # one trajectory per line
//! _ID             STRING   ;
//! _COORDINATES    ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)   ;
//! _OUTPUT_FORMAT  SPATIAL_TEMPORAL
//! ```
//!
//! A line is either an *attribute* (`NAME TYPE DELIMITER`) or a *command*
//! (`NAME VALUE`). Lines starting with `#` are comments.
//!
//! ## Reserved Characters
//!
//! Two private characters are used while flattening text so that it survives
//! whitespace tokenization:
//!
//! - [`LINE_BOND`] joins the physical lines of one multi-line record
//! - [`DATE_BOND`] replaces whitespace inside a `DATETIME["..."]` pattern
pub mod keywords;
pub mod tokens;

pub use keywords::{CoordinateSystem, Keyword, OutputFormat};
pub use tokens::{LexicalClass, Token};

/// Leading marker of a comment line.
pub const COMMENT_CHAR: char = '#';

/// Number of tokens in an attribute declaration (name, type, delimiter).
pub const NUM_PARAMS_ATTR: usize = 3;

/// Number of tokens in a command declaration (command, value).
pub const NUM_PARAMS_CMD: usize = 2;

/// Default number of fractional digits kept when scaling decimals.
pub const DEFAULT_DECIMAL_PREC: u32 = 5;

/// Largest decimal precision a fixed-point scale can hold.
pub const MAX_DECIMAL_PREC: u32 = 28;

/// Physical line break.
pub const LINE_BREAK: &str = "\n";

/// Line space delimiter (`LS`).
pub const LINE_SPACE: &str = " ";

/// Bonds the physical lines of one logical record.
pub const LINE_BOND: char = '\u{1E}';

/// Bonds the pieces of a date pattern that contained whitespace.
pub const DATE_BOND: char = '\u{1F}';

/// Opening of an array type declaration.
pub const ARRAY_OPEN: &str = "ARRAY(";

/// Opening of a date type declaration.
pub const DATETIME_OPEN: &str = "DATETIME[";
