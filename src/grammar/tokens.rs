use std::fmt;

/// Lexical class of a TDDF token.
///
/// Every token carries exactly one class. Classification is driven by the
/// keyword table in [`super::keywords`], with three structural overrides that
/// take priority: array declarations, date declarations and single non-word
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalClass {
    /// Comment line marker
    Comment,

    /// Attribute name, also the default class of the first token in a line
    ///
    /// # Examples
    /// ```text
    /// _ID
    /// _COORDINATES
    /// speed
    /// ```
    Attribute,

    /// Configuration directive
    ///
    /// # Examples
    /// ```text
    /// _OUTPUT_FORMAT
    /// _IGNORE_LINES
    /// ```
    Command,

    /// Single non-word character or one of the delimiter keywords
    ///
    /// # Examples
    /// ```text
    /// ;
    /// ,
    /// LN
    /// EOF
    /// ```
    Delimiter,

    /// Basic attribute type
    ///
    /// # Examples
    /// ```text
    /// DECIMAL
    /// INTEGER
    /// STRING
    /// ```
    Type,

    /// Nested array declaration, always one token up to its closing parenthesis
    ///
    /// # Examples
    /// ```text
    /// ARRAY(_X DECIMAL , _Y DECIMAL , _TIME INTEGER ,)
    /// ```
    ArrayType,

    /// Date type carrying a literal pattern
    ///
    /// # Examples
    /// ```text
    /// DATETIME["yyyy-MM-dd HH:mm:ss"]
    /// ```
    DateType,

    /// Delta-encoded numeric type
    ///
    /// # Examples
    /// ```text
    /// DELTAINTEGER
    /// DELTADECIMAL
    /// ```
    DeltaType,

    /// Output shape keyword
    Format,

    /// Coordinate system keyword
    CoordinateSystem,

    /// Storage back end name
    DatabaseName,

    /// Synthetic end of a declaration line
    EndOfLine,

    /// Any other value
    GenericString,
}

impl LexicalClass {
    /// Short symbolic name, used in log messages.
    pub fn symbol(self) -> &'static str {
        match self {
            LexicalClass::Comment => "$cmnt",
            LexicalClass::Attribute => "$attr",
            LexicalClass::Command => "$cmd",
            LexicalClass::Delimiter => "$dlim",
            LexicalClass::Type => "$type",
            LexicalClass::ArrayType => "$array",
            LexicalClass::DateType => "$dtype",
            LexicalClass::DeltaType => "$etype",
            LexicalClass::Format => "$frmt",
            LexicalClass::CoordinateSystem => "$csys",
            LexicalClass::DatabaseName => "$db",
            LexicalClass::EndOfLine => "$end",
            LexicalClass::GenericString => "$str",
        }
    }
}

impl fmt::Display for LexicalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A token of a TDDF source, tagged with its lexical class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text as written (after pre-processing)
    pub value: String,
    /// Lexical class of the token
    pub class: LexicalClass,
}

impl Token {
    pub fn new(value: impl Into<String>, class: LexicalClass) -> Self {
        Token {
            value: value.into(),
            class,
        }
    }

    /// The synthetic token closing every declaration line.
    pub fn end_of_line() -> Self {
        Token::new("end", LexicalClass::EndOfLine)
    }

    pub fn is(&self, class: LexicalClass) -> bool {
        self.class == class
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.class)
    }
}
