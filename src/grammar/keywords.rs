use std::fmt;
use std::str::FromStr;

use super::LexicalClass;

/// Reserved words of the TDDF grammar.
///
/// The table is closed: every keyword maps to exactly one lexical class through
/// [`Keyword::lexical_class`]. Anything not in the table is either a user
/// attribute name or a generic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Reserved attribute names
    Id,
    Coordinates,
    X,
    Y,
    Lon,
    Lat,
    Time,

    // Commands
    OutputFormat,
    IgnoreAttr,
    IgnoreLines,
    CoordSystem,
    SpatialDim,
    AutoId,
    RecordsDelim,
    DecimalPrec,

    // Types
    Decimal,
    Integer,
    String,
    Boolean,
    Char,
    Datetime,
    Array,
    DeltaInteger,
    DeltaDecimal,

    // Delimiter keywords
    LineBreak,
    LineSpace,
    EndOfFile,

    // Coordinate systems
    Cartesian,
    Geographic,

    // Output shapes
    All,
    Spatial,
    SpatialTemporal,

    // Storage back ends
    Local,
    MongoDb,
    HBase,
    VoltDb,
}

impl Keyword {
    pub const ALL: [Keyword; 36] = [
        Keyword::Id,
        Keyword::Coordinates,
        Keyword::X,
        Keyword::Y,
        Keyword::Lon,
        Keyword::Lat,
        Keyword::Time,
        Keyword::OutputFormat,
        Keyword::IgnoreAttr,
        Keyword::IgnoreLines,
        Keyword::CoordSystem,
        Keyword::SpatialDim,
        Keyword::AutoId,
        Keyword::RecordsDelim,
        Keyword::DecimalPrec,
        Keyword::Decimal,
        Keyword::Integer,
        Keyword::String,
        Keyword::Boolean,
        Keyword::Char,
        Keyword::Datetime,
        Keyword::Array,
        Keyword::DeltaInteger,
        Keyword::DeltaDecimal,
        Keyword::LineBreak,
        Keyword::LineSpace,
        Keyword::EndOfFile,
        Keyword::Cartesian,
        Keyword::Geographic,
        Keyword::All,
        Keyword::Spatial,
        Keyword::SpatialTemporal,
        Keyword::Local,
        Keyword::MongoDb,
        Keyword::HBase,
        Keyword::VoltDb,
    ];

    /// The keyword as written in a TDDF source.
    pub fn name(self) -> &'static str {
        match self {
            Keyword::Id => "_ID",
            Keyword::Coordinates => "_COORDINATES",
            Keyword::X => "_X",
            Keyword::Y => "_Y",
            Keyword::Lon => "_LON",
            Keyword::Lat => "_LAT",
            Keyword::Time => "_TIME",
            Keyword::OutputFormat => "_OUTPUT_FORMAT",
            Keyword::IgnoreAttr => "_IGNORE_ATTR",
            Keyword::IgnoreLines => "_IGNORE_LINES",
            Keyword::CoordSystem => "_COORD_SYSTEM",
            Keyword::SpatialDim => "_SPATIAL_DIM",
            Keyword::AutoId => "_AUTO_ID",
            Keyword::RecordsDelim => "_RECORDS_DELIM",
            Keyword::DecimalPrec => "_DECIMAL_PREC",
            Keyword::Decimal => "DECIMAL",
            Keyword::Integer => "INTEGER",
            Keyword::String => "STRING",
            Keyword::Boolean => "BOOLEAN",
            Keyword::Char => "CHAR",
            Keyword::Datetime => "DATETIME",
            Keyword::Array => "ARRAY",
            Keyword::DeltaInteger => "DELTAINTEGER",
            Keyword::DeltaDecimal => "DELTADECIMAL",
            Keyword::LineBreak => "LN",
            Keyword::LineSpace => "LS",
            Keyword::EndOfFile => "EOF",
            Keyword::Cartesian => "CARTESIAN",
            Keyword::Geographic => "GEOGRAPHIC",
            Keyword::All => "ALL",
            Keyword::Spatial => "SPATIAL",
            Keyword::SpatialTemporal => "SPATIAL_TEMPORAL",
            Keyword::Local => "LOCAL",
            Keyword::MongoDb => "MONGODB",
            Keyword::HBase => "HBASE",
            Keyword::VoltDb => "VOLTDB",
        }
    }

    /// Lexical class of the keyword.
    pub fn lexical_class(self) -> LexicalClass {
        match self {
            Keyword::Id
            | Keyword::Coordinates
            | Keyword::X
            | Keyword::Y
            | Keyword::Lon
            | Keyword::Lat
            | Keyword::Time => LexicalClass::Attribute,

            Keyword::OutputFormat
            | Keyword::IgnoreAttr
            | Keyword::IgnoreLines
            | Keyword::CoordSystem
            | Keyword::SpatialDim
            | Keyword::AutoId
            | Keyword::RecordsDelim
            | Keyword::DecimalPrec => LexicalClass::Command,

            Keyword::Decimal
            | Keyword::Integer
            | Keyword::String
            | Keyword::Boolean
            | Keyword::Char => LexicalClass::Type,
            Keyword::Datetime => LexicalClass::DateType,
            Keyword::Array => LexicalClass::ArrayType,
            Keyword::DeltaInteger | Keyword::DeltaDecimal => LexicalClass::DeltaType,

            Keyword::LineBreak | Keyword::LineSpace | Keyword::EndOfFile => {
                LexicalClass::Delimiter
            }

            Keyword::Cartesian | Keyword::Geographic => LexicalClass::CoordinateSystem,

            Keyword::All | Keyword::Spatial | Keyword::SpatialTemporal => LexicalClass::Format,

            Keyword::Local | Keyword::MongoDb | Keyword::HBase | Keyword::VoltDb => {
                LexicalClass::DatabaseName
            }
        }
    }

    /// Exact, case-sensitive keyword lookup.
    pub fn lookup(word: &str) -> Option<Keyword> {
        Keyword::ALL.iter().copied().find(|k| k.name() == word)
    }

    /// Case-insensitive keyword lookup, used for lexical classification.
    pub fn lookup_ignore_case(word: &str) -> Option<Keyword> {
        Keyword::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(word))
    }

    /// True when `word` is exactly this keyword.
    pub fn matches(self, word: &str) -> bool {
        self.name() == word
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output shape of the transformed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `(x,y)` pairs only
    Spatial,
    /// `(x,y,time)` triples
    SpatialTemporal,
    /// Every point attribute plus the remaining record attributes
    #[default]
    All,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Spatial => "SPATIAL",
            OutputFormat::SpatialTemporal => "SPATIAL_TEMPORAL",
            OutputFormat::All => "ALL",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Keyword::lookup_ignore_case(s) {
            Some(Keyword::Spatial) => Ok(OutputFormat::Spatial),
            Some(Keyword::SpatialTemporal) => Ok(OutputFormat::SpatialTemporal),
            Some(Keyword::All) => Ok(OutputFormat::All),
            _ => Err(format!(
                "unknown output format '{}' (expected ALL, SPATIAL or SPATIAL_TEMPORAL)",
                s
            )),
        }
    }
}

/// Coordinate system of the trajectory points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    #[default]
    Cartesian,
    Geographic,
}

impl CoordinateSystem {
    pub fn name(self) -> &'static str {
        match self {
            CoordinateSystem::Cartesian => "CARTESIAN",
            CoordinateSystem::Geographic => "GEOGRAPHIC",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Keyword::lookup_ignore_case(s) {
            Some(Keyword::Cartesian) => Ok(CoordinateSystem::Cartesian),
            Some(Keyword::Geographic) => Ok(CoordinateSystem::Geographic),
            _ => Err(format!("unsupported coordinate system '{}'", s)),
        }
    }
}

/// Reduces a declared type to its basic keyword.
///
/// # Examples
/// ```text
/// DELTADECIMAL                 -> DECIMAL
/// DELTAINTEGER                 -> INTEGER
/// DATETIME["yyyy-MM-dd"]       -> DATETIME
/// ARRAY(_X DECIMAL , ...)      -> ARRAY
/// STRING                       -> STRING
/// ```
pub fn basic_type(declared: &str) -> &str {
    let upper_starts = |prefix: &str| {
        declared
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    if declared.eq_ignore_ascii_case(Keyword::DeltaDecimal.name()) {
        Keyword::Decimal.name()
    } else if declared.eq_ignore_ascii_case(Keyword::DeltaInteger.name()) {
        Keyword::Integer.name()
    } else if upper_starts(super::DATETIME_OPEN) {
        Keyword::Datetime.name()
    } else if upper_starts(super::ARRAY_OPEN) {
        Keyword::Array.name()
    } else {
        declared
    }
}

/// True for DECIMAL, INTEGER and their delta variants.
pub fn is_number_type(declared: &str) -> bool {
    let basic = basic_type(declared);
    basic.eq_ignore_ascii_case(Keyword::Decimal.name())
        || basic.eq_ignore_ascii_case(Keyword::Integer.name())
}

/// True for DECIMAL and DELTADECIMAL.
pub fn is_decimal_type(declared: &str) -> bool {
    basic_type(declared).eq_ignore_ascii_case(Keyword::Decimal.name())
}

/// True for DELTAINTEGER and DELTADECIMAL.
pub fn is_delta_type(declared: &str) -> bool {
    declared.eq_ignore_ascii_case(Keyword::DeltaInteger.name())
        || declared.eq_ignore_ascii_case(Keyword::DeltaDecimal.name())
}

/// True for `DATETIME["..."]` declarations.
pub fn is_datetime_type(declared: &str) -> bool {
    basic_type(declared) == Keyword::Datetime.name()
}

/// True for `ARRAY(...)` declarations.
pub fn is_array_type(declared: &str) -> bool {
    basic_type(declared) == Keyword::Array.name()
}
