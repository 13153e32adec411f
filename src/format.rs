//! # Format Model
//!
//! The compiled, queryable form of a TDDF description.
//!
//! - **[base]** - `Format`: ordered attribute list with per-attribute delimiters
//! - **[array]** - `ArrayFormat`: the nested `_COORDINATES` array with X/Y/Time positions
//! - **[data]** - `DataFormat`: the whole description, attributes plus command settings
//!
//! Positions are `Option<usize>`: `None` when the attribute is not declared,
//! otherwise an index that is always in range of the attribute list.
//!
//! A `DataFormat` is built once from a validated token sequence (see
//! [`crate::compiler`]) and is read-only afterwards; derived positions are
//! memoized on first query.
pub mod array;
pub mod base;
pub mod data;

pub use array::ArrayFormat;
pub use base::{AttributeEntry, Format, IGNORED_ATTRIBUTE};
pub use data::{DataFormat, RecordDelimiter};
