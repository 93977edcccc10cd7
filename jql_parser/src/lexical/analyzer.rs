//! Tokenizer for query text
//!
//! Produces a [`TokenStream`] that always ends in `Eof`. The first lexical
//! fault is emitted as a single `Error` token and tokenizing stops there;
//! the parser reports it only once it actually reaches that token.

use crate::config::compile_time::lexical::*;
use crate::grammar::keywords::{classify_word_type, is_reserved_character, WordType};
use crate::logging::codes;
use crate::tokens::{StringStyle, Token, TokenKind, TokenStream};
use crate::utils::{Position, Span};
use crate::log_debug;

/// Lexical faults. Positions are those of the offending character.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum LexerError {
    #[error("Illegal character {ch:?} at {position}")]
    IllegalCharacter { ch: char, position: Position },

    #[error("Reserved character '{ch}' at {position}")]
    ReservedCharacter { ch: char, position: Position },

    /// `text` is `None` for a backslash at end of input
    #[error("Illegal escape {text:?} at {position}")]
    IllegalEscape {
        text: Option<String>,
        position: Position,
    },

    /// `text` is the raw input after the opening quote
    #[error("Unfinished string starting at {position}")]
    UnfinishedString { text: String, position: Position },

    #[error("Query too long: {length} characters (max {MAX_QUERY_LENGTH})")]
    QueryTooLong { length: usize },

    #[error("Too many tokens (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { position: Position },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::IllegalCharacter { .. } => codes::lexical::ILLEGAL_CHARACTER,
            LexerError::ReservedCharacter { .. } => codes::lexical::RESERVED_CHARACTER,
            LexerError::IllegalEscape { .. } => codes::lexical::ILLEGAL_ESCAPE,
            LexerError::UnfinishedString { .. } => codes::lexical::UNFINISHED_STRING,
            LexerError::QueryTooLong { .. } => codes::lexical::QUERY_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::IllegalCharacter { position, .. }
            | LexerError::ReservedCharacter { position, .. }
            | LexerError::IllegalEscape { position, .. }
            | LexerError::UnfinishedString { position, .. }
            | LexerError::TooManyTokens { position } => Some(*position),
            LexerError::QueryTooLong { .. } => None,
        }
    }
}

/// Unicode noncharacters: U+FDD0..=U+FDEF and the last two code points of every plane
pub fn is_noncharacter(ch: char) -> bool {
    let cp = ch as u32;
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}

/// Whitespace separating tokens
pub fn is_token_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Characters that may never appear unescaped. Quoted strings may span
/// lines but may not contain raw tabs.
pub fn is_illegal_character(ch: char, quoted: bool) -> bool {
    if is_noncharacter(ch) {
        return true;
    }
    if !ch.is_control() {
        return false;
    }
    if quoted {
        !matches!(ch, '\n' | '\r')
    } else {
        !is_token_whitespace(ch)
    }
}

/// Characters that end a bare word
pub fn is_word_break(ch: char) -> bool {
    is_token_whitespace(ch)
        || is_reserved_character(ch)
        || matches!(
            ch,
            '"' | '\'' | '=' | '!' | '<' | '>' | '~' | '(' | ')' | ',' | '[' | ']' | '&' | '|'
        )
}

/// Single-use tokenizer over one query
pub struct Tokenizer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: Position,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            position: Position::start(),
            tokens: Vec::new(),
        }
    }

    /// Consume the tokenizer and produce the token stream
    pub fn tokenize(mut self) -> TokenStream {
        let length = self.source.chars().count();
        if length > MAX_QUERY_LENGTH {
            self.push_error(LexerError::QueryTooLong { length }, Position::start());
            return TokenStream::new(self.tokens);
        }

        if let Err(error) = self.scan_all() {
            let at = error.position().unwrap_or(self.position);
            self.push_error(error, at);
        }

        log_debug!("Tokenization complete",
            "tokens" => self.tokens.len(),
            "chars" => length
        );

        let end = self.position;
        self.tokens.push(Token::eof(end));
        TokenStream::new(self.tokens)
    }

    fn push_error(&mut self, error: LexerError, at: Position) {
        self.tokens
            .push(Token::new(TokenKind::Error(error), "", Span::point(at)));
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, start: Position) {
        let span = Span::new(start, self.position);
        self.tokens.push(Token::new(kind, text, span));
    }

    fn scan_all(&mut self) -> Result<(), LexerError> {
        loop {
            while self.peek().map(is_token_whitespace).unwrap_or(false) {
                self.bump();
            }

            let start = self.position;
            let Some(ch) = self.peek() else {
                return Ok(());
            };

            if self.tokens.len() >= MAX_TOKEN_COUNT {
                return Err(LexerError::TooManyTokens { position: start });
            }

            match ch {
                '(' | ')' | ',' | '[' | ']' | '~' | '=' => {
                    self.bump();
                    let kind = match ch {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        ',' => TokenKind::Comma,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '~' => TokenKind::Like,
                        _ => TokenKind::Equals,
                    };
                    self.push(kind, ch.to_string(), start);
                }
                '!' => {
                    self.bump();
                    let (kind, text) = match self.peek() {
                        Some('=') => (TokenKind::NotEquals, "!="),
                        Some('~') => (TokenKind::NotLike, "!~"),
                        _ => (TokenKind::Bang, "!"),
                    };
                    if text.len() == 2 {
                        self.bump();
                    }
                    self.push(kind, text, start);
                }
                '<' | '>' => {
                    self.bump();
                    let or_equal = self.peek() == Some('=');
                    if or_equal {
                        self.bump();
                    }
                    let (kind, text) = match (ch, or_equal) {
                        ('<', false) => (TokenKind::LessThan, "<"),
                        ('<', true) => (TokenKind::LessThanOrEqual, "<="),
                        (_, false) => (TokenKind::GreaterThan, ">"),
                        (_, true) => (TokenKind::GreaterThanOrEqual, ">="),
                    };
                    self.push(kind, text, start);
                }
                '&' | '|' => {
                    self.bump();
                    let mut text = ch.to_string();
                    if self.peek() == Some(ch) {
                        self.bump();
                        text.push(ch);
                    }
                    let kind = if ch == '&' {
                        TokenKind::Amp
                    } else {
                        TokenKind::Pipe
                    };
                    self.push(kind, text, start);
                }
                '"' | '\'' => self.scan_quoted(ch)?,
                c if is_reserved_character(c) => {
                    return Err(LexerError::ReservedCharacter {
                        ch: c,
                        position: start,
                    })
                }
                c if is_illegal_character(c, false) => {
                    return Err(LexerError::IllegalCharacter {
                        ch: c,
                        position: start,
                    })
                }
                _ => self.scan_word()?,
            }
        }
    }

    fn scan_word(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        let mut text = String::new();
        let mut escaped = false;

        while let Some(ch) = self.peek() {
            if is_word_break(ch) {
                break;
            }
            if ch == '\\' {
                text.push(self.scan_escape()?);
                escaped = true;
                continue;
            }
            if is_illegal_character(ch, false) {
                // Emit what was read so far; the fault follows it
                self.push_word(text, escaped, start);
                return Err(LexerError::IllegalCharacter {
                    ch,
                    position: self.position,
                });
            }
            self.bump();
            text.push(ch);
        }

        self.push_word(text, escaped, start);
        Ok(())
    }

    fn push_word(&mut self, text: String, escaped: bool, start: Position) {
        if text.is_empty() && !escaped {
            return;
        }
        let kind = if escaped {
            TokenKind::Str(StringStyle::Escaped)
        } else {
            match classify_word_type(&text) {
                WordType::Keyword(keyword) => TokenKind::Keyword(keyword),
                WordType::Reserved => TokenKind::Reserved,
                WordType::Number => TokenKind::Number,
                WordType::Plain => TokenKind::Str(StringStyle::Plain),
            }
        };
        self.push(kind, text, start);
    }

    fn scan_quoted(&mut self, quote: char) -> Result<(), LexerError> {
        let start = self.position;
        self.bump();
        let content_offset = self.position.offset;
        let mut text = String::new();

        loop {
            match self.peek() {
                None => {
                    let rest = self.source.get(content_offset..).unwrap_or_default();
                    return Err(LexerError::UnfinishedString {
                        text: rest.to_string(),
                        position: start,
                    });
                }
                Some(ch) if ch == quote => {
                    self.bump();
                    self.push(TokenKind::Str(StringStyle::Quoted), text, start);
                    return Ok(());
                }
                Some('\\') => text.push(self.scan_escape()?),
                Some(ch) if is_illegal_character(ch, true) => {
                    return Err(LexerError::IllegalCharacter {
                        ch,
                        position: self.position,
                    })
                }
                Some(ch) => {
                    self.bump();
                    text.push(ch);
                }
            }
        }
    }

    /// Decode one escape sequence; the cursor is on the backslash
    fn scan_escape(&mut self) -> Result<char, LexerError> {
        let position = self.position;
        self.bump();

        let Some(ch) = self.peek() else {
            return Err(LexerError::IllegalEscape {
                text: None,
                position,
            });
        };

        let decoded = match ch {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '"' | '\'' | '\\' | ' ' => ch,
            'u' => {
                self.bump();
                return self.scan_unicode_escape(position);
            }
            other => {
                return Err(LexerError::IllegalEscape {
                    text: Some(format!("\\{}", other)),
                    position,
                })
            }
        };
        self.bump();
        Ok(decoded)
    }

    fn scan_unicode_escape(&mut self, position: Position) -> Result<char, LexerError> {
        let mut digits = String::with_capacity(4);
        while digits.len() < 4 {
            match self.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    self.bump();
                    digits.push(h);
                }
                other => {
                    let mut text = format!("\\u{}", digits);
                    if let Some(bad) = other {
                        text.push(bad);
                    }
                    return Err(LexerError::IllegalEscape {
                        text: Some(text),
                        position,
                    });
                }
            }
        }

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexerError::IllegalEscape {
                text: Some(format!("\\u{}", digits)),
                position,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::keywords::Keyword;
    use assert_matches::assert_matches;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input)
            .tokenize()
            .all_tokens()
            .iter()
            .map(|t| t.kind.clone())
            .collect()
    }

    fn texts(input: &str) -> Vec<String> {
        Tokenizer::new(input)
            .tokenize()
            .all_tokens()
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    fn error_of(input: &str) -> LexerError {
        let stream = Tokenizer::new(input).tokenize();
        stream
            .all_tokens()
            .iter()
            .find_map(|t| match &t.kind {
                TokenKind::Error(e) => Some(e.clone()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no lexical error in {:?}", input))
    }

    #[test]
    fn test_simple_clause() {
        assert_eq!(
            kinds("priority = 12"),
            vec![
                TokenKind::Str(StringStyle::Plain),
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("!= !~ ! < <= > >= ~ & && | ||"),
            vec![
                TokenKind::NotEquals,
                TokenKind::NotLike,
                TokenKind::Bang,
                TokenKind::LessThan,
                TokenKind::LessThanOrEqual,
                TokenKind::GreaterThan,
                TokenKind::GreaterThanOrEqual,
                TokenKind::Like,
                TokenKind::Amp,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Pipe,
                TokenKind::Eof
            ]
        );
        assert_eq!(texts("a&&b")[1], "&&");
    }

    #[test]
    fn test_keywords_and_reserved_words() {
        assert_eq!(
            kinds("NOT in Select"),
            vec![
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Keyword(Keyword::In),
                TokenKind::Reserved,
                TokenKind::Eof
            ]
        );
        // Escaped or quoted words never classify as keywords
        assert_eq!(kinds("an\\'d")[0], TokenKind::Str(StringStyle::Escaped));
        assert_eq!(kinds("'and'")[0], TokenKind::Str(StringStyle::Quoted));
    }

    #[test]
    fn test_numbers_must_span_whole_word() {
        assert_eq!(kinds("-29")[0], TokenKind::Number);
        assert_eq!(kinds("1-1")[0], TokenKind::Str(StringStyle::Plain));
        assert_eq!(kinds("12345a")[0], TokenKind::Str(StringStyle::Plain));
        assert_eq!(texts("00012")[0], "00012");
    }

    #[test]
    fn test_word_characters() {
        assert_eq!(texts("a.b-c:d`e")[0], "a.b-c:d`e");
        assert_eq!(texts("cf[10]"), vec!["cf", "[", "10", "]", ""]);
    }

    #[test]
    fn test_quoted_strings_decode_escapes() {
        let stream = Tokenizer::new(r#""a\"b\nA" 'c d'"#).tokenize();
        let tokens = stream.all_tokens();
        assert_eq!(tokens[0].text, "a\"b\nA");
        assert_eq!(tokens[1].text, "c d");
        assert_eq!(tokens[1].column(), 10);
    }

    #[test]
    fn test_positions_are_zero_based_columns() {
        let stream = Tokenizer::new("a\n\tbb =  c").tokenize();
        let tokens = stream.all_tokens();
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 0));
        assert_eq!((tokens[1].line(), tokens[1].column()), (2, 1));
        assert_eq!((tokens[2].line(), tokens[2].column()), (2, 4));
        assert_eq!((tokens[3].line(), tokens[3].column()), (2, 7));
    }

    #[test]
    fn test_reserved_character_stops_tokenizing() {
        let stream = Tokenizer::new("test*dfjd = 'bad'").tokenize();
        let tokens = stream.all_tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "test");
        assert_matches!(
            &tokens[1].kind,
            TokenKind::Error(LexerError::ReservedCharacter { ch: '*', position }) if position.column == 4
        );
        assert!(tokens[2].is_eof());
    }

    #[test]
    fn test_reserved_character_on_later_line() {
        assert_matches!(
            error_of("f\n = \n \n abc *"),
            LexerError::ReservedCharacter { ch: '*', position } if position.line == 4 && position.column == 5
        );
    }

    #[test]
    fn test_illegal_characters() {
        assert_matches!(
            error_of("a = b\u{c}"),
            LexerError::IllegalCharacter { ch: '\u{c}', position } if position.column == 5
        );
        assert_matches!(
            error_of("a = '\tb'"),
            LexerError::IllegalCharacter { ch: '\t', .. }
        );
        assert_matches!(
            error_of("a = \u{fdd0}"),
            LexerError::IllegalCharacter { ch: '\u{fdd0}', .. }
        );
        assert_matches!(
            error_of("a = \"li\u{ffff}ne\""),
            LexerError::IllegalCharacter { ch: '\u{ffff}', .. }
        );
        // Newlines are allowed inside quotes
        assert!(!kinds("a = 'x\ny'")
            .iter()
            .any(|k| matches!(k, TokenKind::Error(_))));
    }

    #[test]
    fn test_illegal_escapes() {
        let cases = [
            ("a = b\\k", Some("\\k"), 5),
            ("a = '\\u278q'", Some("\\u278q"), 5),
            ("a = \\u-", Some("\\u-"), 4),
            ("a = \\uz", Some("\\uz"), 4),
            ("a = \\u27", Some("\\u27"), 4),
            ("a = b\\", None, 5),
        ];
        for (input, expected, column) in cases {
            match error_of(input) {
                LexerError::IllegalEscape { text, position } => {
                    assert_eq!(text.as_deref(), expected, "{}", input);
                    assert_eq!(position.column, column, "{}", input);
                }
                other => panic!("unexpected {:?} for {}", other, input),
            }
        }
    }

    #[test]
    fn test_unfinished_string_reports_opening_quote() {
        assert_matches!(
            error_of("summary ~ \"unterminated"),
            LexerError::UnfinishedString { text, position } if text == "unterminated" && position.column == 10
        );
        assert_matches!(
            error_of("a = '"),
            LexerError::UnfinishedString { text, .. } if text.is_empty()
        );
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(kinds(" \t\r\n "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_error_code_mapping() {
        let error = LexerError::UnfinishedString {
            text: String::new(),
            position: Position::start(),
        };
        assert_eq!(error.error_code(), codes::lexical::UNFINISHED_STRING);
        assert!(LexerError::QueryTooLong { length: 1 }.position().is_none());
    }
}
