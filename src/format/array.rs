use std::ops::Deref;
use std::sync::OnceLock;

use super::Format;
use crate::grammar::{Keyword, NUM_PARAMS_ATTR};
use crate::lexer;

/// Format of an `ARRAY(...)` attribute.
///
/// X matches `_X` or `_LON`, Y matches `_Y` or `_LAT`, Time matches `_TIME`.
/// Positions are computed on first query and kept.
#[derive(Debug, Clone, Default)]
pub struct ArrayFormat {
    format: Format,
    declaration: String,
    x_pos: OnceLock<Option<usize>>,
    y_pos: OnceLock<Option<usize>>,
    time_pos: OnceLock<Option<usize>>,
}

impl ArrayFormat {
    /// Builds the format from an `ARRAY(...)` declaration.
    ///
    /// Incomplete trailing triples are dropped, so this never fails; the
    /// syntax analyzer is the place where malformed arrays are rejected.
    pub fn from_declaration(declaration: &str) -> Self {
        let mut format = Format::new();
        for triple in lexer::analyze_array(declaration).chunks_exact(NUM_PARAMS_ATTR) {
            format.add_attribute(
                triple[0].value.as_str(),
                triple[1].value.as_str(),
                &triple[2].value,
            );
        }
        ArrayFormat {
            format,
            declaration: declaration.to_string(),
            ..Default::default()
        }
    }

    /// The declaration this format was built from.
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn x_index(&self) -> Option<usize> {
        *self
            .x_pos
            .get_or_init(|| self.format.position_of_any(&[Keyword::X, Keyword::Lon]))
    }

    pub fn y_index(&self) -> Option<usize> {
        *self
            .y_pos
            .get_or_init(|| self.format.position_of_any(&[Keyword::Y, Keyword::Lat]))
    }

    pub fn time_index(&self) -> Option<usize> {
        *self
            .time_pos
            .get_or_init(|| self.format.position_of_any(&[Keyword::Time]))
    }

    /// Number of declared spatial axes (0, 1 or 2).
    pub fn spatial_dimensions(&self) -> usize {
        usize::from(self.x_index().is_some()) + usize::from(self.y_index().is_some())
    }

    /// True for positions that are neither X, Y nor Time.
    pub fn is_semantic(&self, index: usize) -> bool {
        Some(index) != self.x_index()
            && Some(index) != self.y_index()
            && Some(index) != self.time_index()
    }
}

impl Deref for ArrayFormat {
    type Target = Format;

    fn deref(&self) -> &Format {
        &self.format
    }
}
