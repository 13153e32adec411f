use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::{
    ARRAY_OPEN, COMMENT_CHAR, DATE_BOND, DATETIME_OPEN, Keyword, LexicalClass, Token,
};

/// Errors raised by the lexical analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No lines, or only comments and blank lines
    InvalidInput,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::InvalidInput => write!(f, "Invalid input: the format description is empty"),
        }
    }
}

impl std::error::Error for LexError {}

/// Lexical analyzer over the lines of a TDDF description.
///
/// The raw lines are pre-processed once on construction (comments dropped,
/// array declarations joined, date patterns bonded, whitespace collapsed);
/// [`Lexer::tokenize`] then turns each logical line into a token run closed
/// by an [`LexicalClass::EndOfLine`] token.
pub struct Lexer {
    lines: Vec<String>,
}

impl Lexer {
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Result<Self, LexError> {
        if lines.is_empty() {
            return Err(LexError::InvalidInput);
        }
        let lines = preprocess(lines);
        if lines.is_empty() {
            return Err(LexError::InvalidInput);
        }
        Ok(Lexer { lines })
    }

    /// Pre-processed logical lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn tokenize(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for line in &self.lines {
            for (i, piece) in split_pieces(line).into_iter().enumerate() {
                tokens.push(classify(piece, i == 0));
            }
            tokens.push(Token::end_of_line());
        }
        log::debug!("lexical analysis produced {} tokens", tokens.len());
        tokens
    }
}

/// Tokenizes a whole TDDF description.
///
/// # Examples
/// ```text
/// _ID  STRING  ;      ->  _ID$attr STRING$type ;$dlim end$end
/// _OUTPUT_FORMAT ALL  ->  _OUTPUT_FORMAT$cmd ALL$frmt end$end
/// ```
pub fn analyze_file<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Token>, LexError> {
    Ok(Lexer::new(lines)?.tokenize())
}

/// Tokenizes the interior of one `ARRAY(...)` declaration as
/// `name type delimiter` triples, without end-of-line markers.
///
/// # Examples
/// ```text
/// ARRAY(_X DECIMAL , _Y DECIMAL ;)
///   ->  _X$attr DECIMAL$type ,$dlim _Y$attr DECIMAL$type ;$dlim
/// ```
pub fn analyze_array(declaration: &str) -> Vec<Token> {
    let body = array_body(declaration);
    split_pieces(body)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| classify(piece, i % 3 == 0))
        .collect()
}

/// Text between `ARRAY(` and its closing parenthesis.
pub fn array_body(declaration: &str) -> &str {
    let trimmed = declaration.trim();
    let inner = if starts_with_ignore_case(trimmed, ARRAY_OPEN) {
        &trimmed[ARRAY_OPEN.len()..]
    } else {
        trimmed
    };
    inner.strip_suffix(')').unwrap_or(inner).trim()
}

/// Classifies a single token.
///
/// Structural overrides come first: array declarations, date declarations and
/// single non-word characters. Then the keyword table, ignoring case. Unknown
/// words are attribute names in first position and generic strings elsewhere.
pub fn classify(value: &str, first: bool) -> Token {
    let class = if starts_with_ignore_case(value, ARRAY_OPEN) {
        LexicalClass::ArrayType
    } else if starts_with_ignore_case(value, DATETIME_OPEN) {
        LexicalClass::DateType
    } else if is_single_non_word(value) {
        LexicalClass::Delimiter
    } else if let Some(keyword) = Keyword::lookup_ignore_case(value) {
        keyword.lexical_class()
    } else if first {
        LexicalClass::Attribute
    } else {
        LexicalClass::GenericString
    };
    Token::new(value, class)
}

/// Normalizes raw description lines into logical lines.
///
/// Running it again over its own output returns the same lines.
pub fn preprocess<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut result = Vec::new();
    let mut iter = lines.iter().map(|l| l.as_ref());

    while let Some(line) = iter.next() {
        if is_skippable(line) {
            continue;
        }
        let mut logical = bond_date_patterns(line.trim());

        if let Some(open) = find_ignore_case(&logical, ARRAY_OPEN) {
            while closing_paren(&logical[open + ARRAY_OPEN.len()..]).is_none() {
                match iter.by_ref().find(|next| !is_skippable(next)) {
                    Some(next) => {
                        logical.push(' ');
                        logical.push_str(&bond_date_patterns(next.trim()));
                    }
                    None => break,
                }
            }
        }

        result.push(logical.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    result
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_CHAR)
}

fn date_pattern_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)DATETIME\["(.*?)"\]"#).ok())
        .as_ref()
}

fn bond_date_patterns(line: &str) -> String {
    let Some(re) = date_pattern_regex() else {
        return line.to_string();
    };
    re.replace_all(line, |caps: &regex::Captures<'_>| {
        let whole = &caps[0];
        let bonded: String = caps[1]
            .chars()
            .map(|c| if c.is_whitespace() { DATE_BOND } else { c })
            .collect();
        format!("{}\"{}\"]", &whole[..DATETIME_OPEN.len()], bonded)
    })
    .into_owned()
}

/// Splits a logical line into raw token texts, keeping an `ARRAY(...)`
/// declaration and a `DATETIME["..."]` declaration each as a single piece.
fn split_pieces(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        let end = if starts_with_ignore_case(rest, ARRAY_OPEN) {
            closing_paren(&rest[ARRAY_OPEN.len()..])
                .map(|close| ARRAY_OPEN.len() + close + 1)
                .unwrap_or(rest.len())
        } else if starts_with_ignore_case(rest, DATETIME_OPEN) {
            rest.find("\"]")
                .map(|close| close + 2)
                .unwrap_or_else(|| next_space(rest))
        } else {
            next_space(rest)
        };
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece);
        rest = tail.trim_start();
    }
    pieces
}

fn next_space(s: &str) -> usize {
    s.find(char::is_whitespace).unwrap_or(s.len())
}

/// Byte offset of the parenthesis closing an already opened `ARRAY(`.
///
/// A parenthesis standing alone in the delimiter slot of a `name type
/// delimiter` triple is a delimiter, not structure.
fn closing_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut slot = 0usize;
    for (offset, word) in words(s) {
        if depth == 1 && slot % 3 == 2 && (word == "(" || word == ")") {
            slot += 1;
            continue;
        }
        for (i, c) in word.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(offset + i);
                    }
                }
                _ => {}
            }
        }
        if depth == 1 {
            slot += 1;
        }
    }
    None
}

/// Whitespace-separated words with their byte offsets.
fn words(s: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(begin)) => {
                words.push((begin, &s[begin..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push((begin, &s[begin..]));
    }
    words
}

fn is_single_non_word(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !(c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn find_ignore_case(s: &str, needle: &str) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .find(|&i| starts_with_ignore_case(&s[i..], needle))
}

#[test]
fn test_preprocess_is_idempotent() {
    let raw = [
        "# trajectories",
        "_ID\tSTRING\t;",
        "",
        "_COORDINATES   ARRAY(_X DECIMAL ,",
        "   # inner comment",
        "   _Y DECIMAL ,",
        "   _TIME DATETIME[\"yyyy-MM-dd HH:mm:ss\"] ,)   ;",
    ];
    let once = preprocess(&raw);
    let twice = preprocess(&once);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
    assert_eq!(
        once[1],
        "_COORDINATES ARRAY(_X DECIMAL , _Y DECIMAL , _TIME DATETIME[\"yyyy-MM-dd\u{1F}HH:mm:ss\"] ,) ;"
    );
}

#[test]
fn test_closing_paren_skips_standalone_delimiter() {
    assert_eq!(closing_paren("_X DECIMAL ) _Y DECIMAL ,)"), Some(25));
    assert_eq!(closing_paren("_X DECIMAL ,"), None);
    assert_eq!(closing_paren("_X DECIMAL )"), None);
    assert_eq!(closing_paren("_X DECIMAL , )"), Some(13));
    assert_eq!(closing_paren("_X DECIMAL ,) ;"), Some(12));
}

#[test]
fn test_single_non_word() {
    assert!(is_single_non_word(";"));
    assert!(is_single_non_word(","));
    assert!(!is_single_non_word("_"));
    assert!(!is_single_non_word("a"));
    assert!(!is_single_non_word(";;"));
}
