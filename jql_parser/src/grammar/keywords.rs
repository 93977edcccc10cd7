//! Keyword and reserved-word tables
//!
//! The tokenizer classifies bare words against these tables and the
//! fragment validators consult the same tables, so the two can never
//! disagree about what needs quoting.
use serde::{Deserialize, Serialize};

/// Words with a grammatical role. Matched case-insensitively, and only
/// for bare words written without escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === LOGICAL ===
    And,
    Or,
    Not,

    // === OPERATOR WORDS ===
    In,
    Is,
    Was,
    Changed,

    // === OPERAND MARKERS ===
    Empty,
    Null,

    // === FIELD FORMS ===
    Cf,

    // === ORDERING ===
    Order,
    By,
    Asc,
    Desc,

    // === HISTORY PREDICATES ===
    After,
    Before,
    On,
    From,
    To,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Is => "IS",
            Self::Was => "WAS",
            Self::Changed => "CHANGED",
            Self::Empty => "EMPTY",
            Self::Null => "NULL",
            Self::Cf => "cf",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::After => "AFTER",
            Self::Before => "BEFORE",
            Self::On => "ON",
            Self::From => "FROM",
            Self::To => "TO",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_lowercase().as_str() {
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "in" => Self::In,
            "is" => Self::Is,
            "was" => Self::Was,
            "changed" => Self::Changed,
            "empty" => Self::Empty,
            "null" => Self::Null,
            "cf" => Self::Cf,
            "order" => Self::Order,
            "by" => Self::By,
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            "after" => Self::After,
            "before" => Self::Before,
            "on" => Self::On,
            "from" => Self::From,
            "to" => Self::To,
            _ => return None,
        };
        Some(keyword)
    }

    pub const fn is_empty_marker(self) -> bool {
        matches!(self, Self::Empty | Self::Null)
    }

    pub const fn is_sort_direction(self) -> bool {
        matches!(self, Self::Asc | Self::Desc)
    }

    pub const fn is_predicate(self) -> bool {
        matches!(
            self,
            Self::After | Self::Before | Self::On | Self::From | Self::To | Self::By
        )
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `DURING` is only meaningful after a history operator and is matched
/// by the parser rather than the tokenizer.
pub const DURING: &str = "during";

/// Words that must be quoted to be used as names or values. Sorted for
/// binary search. Includes every keyword.
static RESERVED_WORDS: &[&str] = &[
    "abort", "access", "add", "after", "alias", "all", "alter", "and", "any", "as", "asc",
    "audit", "avg", "before", "begin", "between", "boolean", "break", "by", "byte", "catch",
    "cf", "changed", "char", "character", "check", "checkpoint", "collate", "collation",
    "column", "commit", "connect", "continue", "count", "create", "current", "date",
    "decimal", "declare", "decrement", "default", "defaults", "define", "delete",
    "delimiter", "desc", "difference", "distinct", "divide", "do", "double", "drop", "else",
    "empty", "encoding", "end", "equals", "escape", "exclusive", "exec", "execute",
    "exists", "explain", "false", "fetch", "field", "file", "first", "float", "for", "from",
    "function", "go", "goto", "grant", "greater", "group", "having", "identified", "if",
    "immediate", "in", "increment", "index", "initial", "inner", "inout", "input", "insert",
    "int", "integer", "intersect", "intersection", "into", "is", "isempty", "isnull", "join",
    "last", "left", "less", "like", "limit", "lock", "long", "max", "min", "minus", "mode",
    "modify", "modulo", "more", "multiply", "next", "noaudit", "not", "notin", "nowait",
    "null", "number", "object", "of", "on", "option", "or", "order", "outer", "output",
    "power", "previous", "prior", "privileges", "public", "raise", "raw", "remainder",
    "rename", "resource", "return", "returns", "revoke", "right", "row", "rowid", "rownum",
    "rows", "select", "session", "set", "share", "size", "sqrt", "start", "strict", "string",
    "subtract", "sum", "synonym", "table", "then", "to", "trans", "transaction", "trigger",
    "true", "uid", "union", "unique", "update", "user", "validate", "values", "view", "was",
    "when", "whenever", "where", "while", "with",
];

pub fn reserved_words() -> &'static [&'static str] {
    RESERVED_WORDS
}

/// Case-insensitive reserved-word check (keywords included)
pub fn is_reserved_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Characters that may not appear unquoted
pub const RESERVED_CHARACTERS: &[char] = &['{', '}', '*', '/', '%', '+', '$', '#', '@', '?', ';', '^'];

pub fn is_reserved_character(ch: char) -> bool {
    RESERVED_CHARACTERS.contains(&ch)
}

/// How a bare word is classified by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordType {
    Keyword(Keyword),
    Reserved,
    Number,
    Plain,
}

/// Classify a bare word that contains no escapes
pub fn classify_word_type(word: &str) -> WordType {
    if let Some(keyword) = Keyword::from_word(word) {
        WordType::Keyword(keyword)
    } else if is_reserved_word(word) {
        WordType::Reserved
    } else if is_number_text(word) {
        WordType::Number
    } else {
        WordType::Plain
    }
}

/// `-?[0-9]+` over the whole text
pub fn is_number_text(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
