use crate::grammar::keywords::{self, Keyword};
use crate::grammar::{LINE_BOND, LINE_SPACE};

/// Type tag of the pseudo-attribute created by `_IGNORE_ATTR`.
pub const IGNORED_ATTRIBUTE: &str = "_IGNORE_ATTR";

/// One declared attribute: name, declared type and the delimiter closing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    pub name: String,
    pub attr_type: String,
    pub delimiter: String,
}

impl AttributeEntry {
    pub fn is_ignored(&self) -> bool {
        self.attr_type == IGNORED_ATTRIBUTE
    }

    pub fn is_array_type(&self) -> bool {
        keywords::is_array_type(&self.attr_type)
    }

    pub fn is_datetime_type(&self) -> bool {
        keywords::is_datetime_type(&self.attr_type)
    }

    pub fn is_delta_type(&self) -> bool {
        keywords::is_delta_type(&self.attr_type)
    }

    pub fn is_number_type(&self) -> bool {
        keywords::is_number_type(&self.attr_type)
    }

    pub fn is_decimal_type(&self) -> bool {
        keywords::is_decimal_type(&self.attr_type)
    }

    /// Declared type reduced to its basic keyword.
    pub fn basic_type(&self) -> &str {
        keywords::basic_type(&self.attr_type)
    }
}

/// Ordered list of attributes, in the positional order of the raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Format {
    attributes: Vec<AttributeEntry>,
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute, resolving delimiter keywords.
    ///
    /// # Examples
    /// ```text
    /// LS   ->  " "
    /// LN   ->  U+001E  (records are flattened to one line before splitting)
    /// EOF  ->  ""      (the attribute takes the rest of the record)
    /// ;    ->  ";"
    /// ```
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        attr_type: impl Into<String>,
        delimiter: &str,
    ) {
        let delimiter = match Keyword::lookup(delimiter) {
            Some(Keyword::LineSpace) => LINE_SPACE.to_string(),
            Some(Keyword::LineBreak) => LINE_BOND.to_string(),
            Some(Keyword::EndOfFile) => String::new(),
            _ => delimiter.to_string(),
        };
        self.attributes.push(AttributeEntry {
            name: name.into(),
            attr_type: attr_type.into(),
            delimiter,
        });
    }

    /// Appends a pseudo-attribute whose value is skipped.
    pub fn add_ignored(&mut self, delimiter: &str) {
        self.add_attribute(IGNORED_ATTRIBUTE, IGNORED_ATTRIBUTE, delimiter);
    }

    pub fn attributes(&self) -> &[AttributeEntry] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&AttributeEntry> {
        self.attributes.get(index)
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Number of attributes that are not ignored.
    pub fn num_valid_attributes(&self) -> usize {
        self.attributes.iter().filter(|a| !a.is_ignored()).count()
    }

    /// True when `index` is an ignored pseudo-attribute. Out of range is false.
    pub fn is_ignored(&self, index: usize) -> bool {
        self.attributes.get(index).is_some_and(|a| a.is_ignored())
    }

    /// Resolved delimiters, parallel to [`Format::attributes`].
    pub fn delimiters(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.delimiter.as_str())
    }

    /// Position of the first attribute named exactly `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Position of the first attribute matching any of `names`.
    pub fn position_of_any(&self, names: &[Keyword]) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| names.iter().any(|k| k.matches(&a.name)))
    }
}
