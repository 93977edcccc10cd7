//! One constructor per failure kind
//!
//! Positions passed in are raw tokenizer positions: 1-based line and
//! 0-based column. Constructors that take a [`Token`] switch to the
//! `.eof` key variant when the token is end of input.

use super::format::{display_character, escape_character, is_blank, sanitize_text};
use super::{MessageKind, MessagePosition, ParseErrorMessage};
use crate::lexical::LexerError;
use crate::tokens::{Token, TokenKind};
use crate::utils::Position;

fn raw(position: Position) -> (i32, i32) {
    (
        i32::try_from(position.line).unwrap_or(-1),
        i32::try_from(position.column).unwrap_or(-1),
    )
}

fn token_position(token: &Token) -> MessagePosition {
    let (line, column) = raw(token.position());
    MessagePosition::from_raw(line, column)
}

/// Position arguments followed by `extra`
fn positioned(
    kind: MessageKind,
    position: MessagePosition,
    extra: impl IntoIterator<Item = String>,
) -> ParseErrorMessage {
    let mut args: Vec<String> = position.args().into();
    args.extend(extra);
    ParseErrorMessage::new(kind, position, args)
}

/// Token-located message: `.eof` variant without position at end of
/// input, otherwise position plus the sanitised token text
fn at_token(token: &Token, kind: MessageKind, eof_kind: MessageKind) -> ParseErrorMessage {
    if token.is_eof() {
        ParseErrorMessage::new(eof_kind, MessagePosition::UNKNOWN, Vec::new())
    } else {
        positioned(kind, token_position(token), [sanitize_text(&token.to_string())])
    }
}

// === LEXICAL ===

pub fn reserved_word(word: &str, line: i32, column: i32) -> ParseErrorMessage {
    positioned(
        MessageKind::ReservedWord,
        MessagePosition::from_raw(line, column),
        [sanitize_text(word)],
    )
}

/// `text` is `None` for a backslash at end of input
pub fn illegal_escape(text: Option<&str>, line: i32, column: i32) -> ParseErrorMessage {
    let position = MessagePosition::from_raw(line, column);
    match text {
        Some(text) if !is_blank(text) => {
            positioned(MessageKind::IllegalEscape, position, [sanitize_text(text)])
        }
        _ => positioned(MessageKind::IllegalEscapeBlank, position, Vec::new()),
    }
}

pub fn reserved_character(ch: char, line: i32, column: i32) -> ParseErrorMessage {
    positioned(
        MessageKind::ReservedCharacter,
        MessagePosition::from_raw(line, column),
        [display_character(ch), escape_character(ch)],
    )
}

pub fn illegal_character(ch: char, line: i32, column: i32) -> ParseErrorMessage {
    positioned(
        MessageKind::IllegalCharacter,
        MessagePosition::from_raw(line, column),
        [display_character(ch), escape_character(ch)],
    )
}

pub fn unfinished_string(text: Option<&str>, line: i32, column: i32) -> ParseErrorMessage {
    let position = MessagePosition::from_raw(line, column);
    match text {
        Some(text) if !is_blank(text) => {
            positioned(MessageKind::UnfinishedString, position, [sanitize_text(text)])
        }
        _ => positioned(MessageKind::UnfinishedStringBlank, position, Vec::new()),
    }
}

/// Arguments carry the accepted signed 64-bit range
pub fn illegal_number(text: &str, line: i32, column: i32) -> ParseErrorMessage {
    positioned(
        MessageKind::IllegalNumber,
        MessagePosition::from_raw(line, column),
        [sanitize_text(text), i64::MIN.to_string(), i64::MAX.to_string()],
    )
}

/// Translate the fault carried by an `Error` token
pub fn from_lexer_error(error: &LexerError) -> ParseErrorMessage {
    let (line, column) = error.position().map(raw).unwrap_or((-1, -1));
    match error {
        LexerError::IllegalCharacter { ch, .. } => illegal_character(*ch, line, column),
        LexerError::ReservedCharacter { ch, .. } => reserved_character(*ch, line, column),
        LexerError::IllegalEscape { text, .. } => illegal_escape(text.as_deref(), line, column),
        LexerError::UnfinishedString { text, .. } => {
            unfinished_string(Some(text.as_str()), line, column)
        }
        LexerError::QueryTooLong { .. } | LexerError::TooManyTokens { .. } => {
            generic_parse_error()
        }
    }
}

// === NAMES ===

pub fn empty_field_name(line: i32, column: i32) -> ParseErrorMessage {
    positioned(MessageKind::EmptyField, MessagePosition::from_raw(line, column), Vec::new())
}

pub fn empty_function_name(line: i32, column: i32) -> ParseErrorMessage {
    positioned(MessageKind::EmptyFunction, MessagePosition::from_raw(line, column), Vec::new())
}

/// A `[` where a field was expected means the `cf` prefix is missing
pub fn bad_field_name(token: &Token) -> ParseErrorMessage {
    if token.kind == TokenKind::LBracket {
        return positioned(MessageKind::NoCustomField, token_position(token), Vec::new());
    }
    at_token(token, MessageKind::NoField, MessageKind::NoFieldEof)
}

pub fn bad_custom_field_id(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::BadCustomFieldId, MessageKind::BadCustomFieldIdEof)
}

pub fn bad_property_argument(token: &Token) -> ParseErrorMessage {
    positioned(
        MessageKind::BadPropertyArgument,
        token_position(token),
        [sanitize_text(&token.to_string())],
    )
}

// === STRUCTURE ===

pub fn bad_sort_order(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::NoOrder, MessageKind::NoOrderEof)
}

pub fn bad_operator(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::NoOperator, MessageKind::NoOperatorEof)
}

pub fn need_logical_operator(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::LogicalOperator, MessageKind::LogicalOperatorEof)
}

pub fn bad_operand(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::BadOperand, MessageKind::BadOperandEof)
}

pub fn bad_function_argument(token: &Token) -> ParseErrorMessage {
    at_token(token, MessageKind::BadFunctionArgument, MessageKind::BadFunctionArgumentEof)
}

/// Has no `.eof` variant; end of input reports an unknown position
pub fn empty_function_argument(token: &Token) -> ParseErrorMessage {
    let position = if token.is_eof() {
        MessagePosition::UNKNOWN
    } else {
        token_position(token)
    };
    positioned(MessageKind::EmptyFunctionArgument, position, Vec::new())
}

pub fn expected_text(token: &Token, expected: &str) -> ParseErrorMessage {
    if token.is_eof() {
        return ParseErrorMessage::new(
            MessageKind::ExpectedTextEof,
            MessagePosition::UNKNOWN,
            vec![expected.to_string()],
        );
    }
    positioned(
        MessageKind::ExpectedText,
        token_position(token),
        [expected.to_string(), sanitize_text(&token.to_string())],
    )
}

pub fn expected_text2(token: &Token, first: &str, second: &str) -> ParseErrorMessage {
    if token.is_eof() {
        return ParseErrorMessage::new(
            MessageKind::ExpectedText2Eof,
            MessagePosition::UNKNOWN,
            vec![first.to_string(), second.to_string()],
        );
    }
    positioned(
        MessageKind::ExpectedText2,
        token_position(token),
        [
            first.to_string(),
            second.to_string(),
            sanitize_text(&token.to_string()),
        ],
    )
}

pub fn too_deeply_nested(token: &Token, max_depth: usize) -> ParseErrorMessage {
    let position = if token.is_eof() {
        MessagePosition::UNKNOWN
    } else {
        token_position(token)
    };
    positioned(MessageKind::TooDeeplyNested, position, [max_depth.to_string()])
}

// === SEMANTIC ===

/// `operand` is the rendered operand text
pub fn unsupported_operand(operator: &str, operand: &str) -> ParseErrorMessage {
    ParseErrorMessage::new(
        MessageKind::UnsupportedOperand,
        MessagePosition::UNKNOWN,
        vec![operator.to_string(), sanitize_text(operand)],
    )
}

pub fn unsupported_predicate(predicate: &str, operator: &str) -> ParseErrorMessage {
    ParseErrorMessage::new(
        MessageKind::UnsupportedPredicate,
        MessagePosition::UNKNOWN,
        vec![predicate.to_string(), operator.to_string()],
    )
}

// === FALLBACK ===

pub fn generic_parse_error() -> ParseErrorMessage {
    ParseErrorMessage::new(MessageKind::UnknownNoPosition, MessagePosition::UNKNOWN, Vec::new())
}

pub fn generic_parse_error_at(line: i32, column: i32) -> ParseErrorMessage {
    positioned(MessageKind::Unknown, MessagePosition::from_raw(line, column), Vec::new())
}

pub fn generic_parse_error_token(token: &Token) -> ParseErrorMessage {
    if token.is_eof() {
        generic_parse_error()
    } else {
        let (line, column) = raw(token.position());
        generic_parse_error_at(line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::StringStyle;
    use crate::utils::Span;

    fn token(kind: TokenKind, text: &str, line: u32, column: u32) -> Token {
        let start = Position::new(0, line, column);
        Token::new(kind, text, Span::new(start, start.advance_str(text)))
    }

    fn word(text: &str, line: u32, column: u32) -> Token {
        token(TokenKind::Str(StringStyle::Plain), text, line, column)
    }

    fn eof() -> Token {
        Token::eof(Position::new(40, 3, 7))
    }

    fn message(key: &str, line: i32, column: i32, args: &[&str]) -> ParseErrorMessage {
        ParseErrorMessage {
            key: key.to_string(),
            line,
            column,
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    #[test]
    fn test_reserved_word() {
        assert_eq!(
            reserved_word("reserved", 1, 20),
            message("jql.parse.reserved.word", 1, 21, &["1", "21", "reserved"])
        );
        assert_eq!(
            reserved_word("reserved", -1, 10),
            message("jql.parse.reserved.word", -1, 11, &["?", "?", "reserved"])
        );
        assert_eq!(
            reserved_word("rese\nrv\red", 10, -1),
            message("jql.parse.reserved.word", 10, -1, &["10", "?", "rese rv ed"])
        );
    }

    #[test]
    fn test_illegal_escape() {
        assert_eq!(
            illegal_escape(Some("\\u4\n84"), 1, 20).args,
            ["1", "21", "\\u4 84"]
        );
        let blank = illegal_escape(None, 1, -1);
        assert_eq!(blank.key, "jql.parse.illegal.escape.blank");
        assert_eq!(blank.args, ["1", "?"]);
        assert_eq!(
            illegal_escape(Some("   "), -1, 2002).key,
            "jql.parse.illegal.escape.blank"
        );
    }

    #[test]
    fn test_characters() {
        assert_eq!(
            reserved_character('a', 1, 20),
            message("jql.parse.reserved.character", 1, 21, &["1", "21", "a", "\\u0061"])
        );
        assert_eq!(
            reserved_character('\n', 7, 7).args,
            ["7", "8", "U+000A", "\\n"]
        );
        assert_eq!(
            illegal_character('\u{ffff}', -1, 7).args,
            ["?", "?", "U+FFFF", "\\uffff"]
        );
        assert_eq!(illegal_character('\t', 4, 8).args, ["4", "9", "TAB", "\\t"]);
    }

    #[test]
    fn test_text_args_hide_control_characters() {
        assert_eq!(
            unsupported_operand("=", "(\"x\u{1}y\")").args,
            ["=", "(\"xU+0001y\")"]
        );
        assert_eq!(
            illegal_number("12\t3", 2, 0).args[2],
            "12TAB3"
        );
    }

    #[test]
    fn test_unfinished_string() {
        assert_eq!(
            unfinished_string(None, -1, -1),
            message("jql.parse.unfinished.string.blank", -1, -1, &["?", "?"])
        );
        assert_eq!(
            unfinished_string(Some("d\nylan"), -20000, -1).args,
            ["?", "?", "d ylan"]
        );
        assert_eq!(
            unfinished_string(Some(""), 1, 3).key,
            "jql.parse.unfinished.string.blank"
        );
    }

    #[test]
    fn test_illegal_number() {
        assert_eq!(
            illegal_number("7383\neeee", 1, 4).args,
            [
                "1",
                "5",
                "7383 eeee",
                "-9223372036854775808",
                "9223372036854775807"
            ]
        );
    }

    #[test]
    fn test_token_messages_switch_to_eof_variant() {
        let cases: [(fn(&Token) -> ParseErrorMessage, &str); 7] = [
            (bad_field_name, "jql.parse.no.field"),
            (bad_sort_order, "jql.parse.no.order"),
            (bad_operator, "jql.parse.no.operator"),
            (bad_custom_field_id, "jql.parse.bad.custom.field.id"),
            (need_logical_operator, "jql.parse.logical.operator"),
            (bad_operand, "jql.parse.bad.operand"),
            (bad_function_argument, "jql.parse.bad.function.argument"),
        ];
        for (build, key) in cases {
            assert_eq!(build(&word("bad", 99, 2)), message(key, 99, 3, &["99", "3", "bad"]));
            assert_eq!(build(&eof()), message(&format!("{}.eof", key), -1, -1, &[]));
        }
    }

    #[test]
    fn test_token_text_is_sanitised() {
        assert_eq!(
            need_logical_operator(&word("b\ra\nd", 5, 2)).args,
            ["5", "3", "b a d"]
        );
    }

    #[test]
    fn test_bracket_means_missing_custom_field_prefix() {
        let bracket = token(TokenKind::LBracket, "[", 1, 0);
        assert_eq!(
            bad_field_name(&bracket),
            message("jql.parse.no.cf.field", 1, 1, &["1", "1"])
        );
    }

    #[test]
    fn test_empty_function_argument() {
        assert_eq!(
            empty_function_argument(&eof()),
            message("jql.parse.empty.function.argument", -1, -1, &["?", "?"])
        );
        assert_eq!(
            empty_function_argument(&word(")", 1, 2)).args,
            ["1", "3"]
        );
    }

    #[test]
    fn test_expected_text() {
        assert_eq!(
            expected_text(&eof(), "end"),
            message("jql.parse.expected.text.eof", -1, -1, &["end"])
        );
        assert_eq!(
            expected_text(&word("bad", 99, 2), "by").args,
            ["99", "3", "by", "bad"]
        );
        assert_eq!(
            expected_text2(&eof(), "end", "here"),
            message("jql.parse.expected.text.2.eof", -1, -1, &["end", "here"])
        );
        assert_eq!(
            expected_text2(&word("ba\r\ndder", 99, 2), "order", "by").args,
            ["99", "3", "order", "by", "ba  dder"]
        );
    }

    #[test]
    fn test_semantic_messages_have_no_position() {
        let operand = unsupported_operand("is", "foo");
        assert_eq!(
            operand,
            message("jql.parse.unsupported.operand", -1, -1, &["is", "foo"])
        );
        let predicate = unsupported_predicate("from", "was");
        assert_eq!(predicate.args, ["from", "was"]);
        assert!(!predicate.has_position());
    }

    #[test]
    fn test_generic_errors() {
        assert_eq!(
            generic_parse_error(),
            message("jql.parse.unknown.no.pos", -1, -1, &[])
        );
        assert_eq!(
            generic_parse_error_at(1, 20),
            message("jql.parse.unknown", 1, 21, &["1", "21"])
        );
        assert_eq!(generic_parse_error_at(-2, 20).args, ["?", "?"]);
        assert_eq!(generic_parse_error_token(&eof()).key, "jql.parse.unknown.no.pos");
        assert_eq!(generic_parse_error_token(&word("x", 2, 0)).args, ["2", "1"]);
    }

    #[test]
    fn test_lexer_errors_translate() {
        let error = LexerError::ReservedCharacter {
            ch: '*',
            position: Position::new(14, 4, 5),
        };
        assert_eq!(from_lexer_error(&error).args, ["4", "6", "*", "\\u002a"]);

        let too_long = LexerError::QueryTooLong { length: 1 << 20 };
        assert_eq!(from_lexer_error(&too_long).key, "jql.parse.unknown.no.pos");
    }
}
