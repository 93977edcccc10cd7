//! Token vocabulary produced by the tokenizer
use crate::grammar::keywords::Keyword;
use crate::lexical::LexerError;
use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a string token was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringStyle {
    /// Bare word with no escapes
    Plain,
    /// Bare word containing at least one escape sequence
    Escaped,
    /// Single- or double-quoted
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // === PUNCTUATION ===
    LParen,   // (
    RParen,   // )
    Comma,    // ,
    LBracket, // [
    RBracket, // ]

    // === COMPARISON OPERATORS ===
    Equals,             // =
    NotEquals,          // !=
    Like,               // ~
    NotLike,            // !~
    LessThan,           // <
    LessThanOrEqual,    // <=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=

    // === LOGICAL SYMBOLS ===
    Amp,  // & or &&
    Pipe, // | or ||
    Bang, // !

    // === WORDS ===
    Keyword(Keyword),
    /// Text value; `Token::text` holds the decoded content
    Str(StringStyle),
    /// Bare `-?[0-9]+`; `Token::text` holds the digits as written
    Number,
    /// Bare word from the reserved table that has no grammatical role
    Reserved,

    // === TERMINATORS ===
    /// First lexical fault; always followed by `Eof`
    Error(LexerError),
    Eof,
}

impl TokenKind {
    /// Symbol kinds render as their canonical source text
    pub fn symbol(&self) -> Option<&'static str> {
        let text = match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Bang => "!",
            _ => return None,
        };
        Some(text)
    }
}

/// A classified lexeme with its decoded text and source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn eof(at: Position) -> Self {
        Self::new(TokenKind::Eof, "", Span::point(at))
    }

    pub fn position(&self) -> Position {
        self.span.start
    }

    /// 1-based line
    pub fn line(&self) -> i32 {
        self.span.start.line as i32
    }

    /// 0-based character index within the line
    pub fn column(&self) -> i32 {
        self.span.start.column as i32
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// String or number: the tokens that can name things
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Str(_) | TokenKind::Number)
    }

    /// Word written bare, without quotes or escapes
    pub fn is_plain_word(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Str(StringStyle::Plain) | TokenKind::Number
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Eof => write!(f, "<EOF>"),
            _ => write!(f, "{}", self.text),
        }
    }
}
