//! Parse failure messages
//!
//! A [`ParseErrorMessage`] is an i18n key plus ready-to-format arguments.
//! All of them are built by the constructors in [`factory`], which are
//! the only place raw token positions are converted to the 1-based form
//! shown to users.

pub mod factory;
pub mod format;

use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};

pub use format::{display_character, escape_character, sanitize_text};

/// Prefix shared by every message key
pub const KEY_PREFIX: &str = "jql.parse.";

/// Placeholder argument for an unknown line or column
pub const UNKNOWN_POSITION_ARG: &str = "?";

// === POSITION ===

/// A user-facing position: 1-based line and column, `-1` when unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessagePosition {
    pub line: i32,
    pub column: i32,
}

impl MessagePosition {
    pub const UNKNOWN: Self = Self {
        line: -1,
        column: -1,
    };

    /// Normalise a tokenizer position: `line` is 1-based, `column` the
    /// 0-based character index. Non-positive lines and negative columns
    /// become unknown.
    pub fn from_raw(line: i32, column: i32) -> Self {
        Self {
            line: if line > 0 { line } else { -1 },
            column: if column >= 0 { column.saturating_add(1) } else { -1 },
        }
    }

    pub fn is_line_known(&self) -> bool {
        self.line > 0
    }

    pub fn is_column_known(&self) -> bool {
        self.column > 0
    }

    /// `[line, column]` as message arguments. An unknown line makes the
    /// column meaningless, so both become `?`.
    pub fn args(&self) -> [String; 2] {
        if !self.is_line_known() {
            return [UNKNOWN_POSITION_ARG.into(), UNKNOWN_POSITION_ARG.into()];
        }
        let column = if self.is_column_known() {
            self.column.to_string()
        } else {
            UNKNOWN_POSITION_ARG.to_string()
        };
        [self.line.to_string(), column]
    }
}

// === KINDS ===

/// Every distinct message key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    ReservedWord,
    IllegalEscape,
    IllegalEscapeBlank,
    ReservedCharacter,
    IllegalCharacter,
    UnfinishedString,
    UnfinishedStringBlank,
    IllegalNumber,
    EmptyField,
    EmptyFunction,
    NoField,
    NoFieldEof,
    NoCustomField,
    NoOrder,
    NoOrderEof,
    NoOperator,
    NoOperatorEof,
    BadCustomFieldId,
    BadCustomFieldIdEof,
    LogicalOperator,
    LogicalOperatorEof,
    BadOperand,
    BadOperandEof,
    BadFunctionArgument,
    BadFunctionArgumentEof,
    EmptyFunctionArgument,
    BadPropertyArgument,
    ExpectedText,
    ExpectedTextEof,
    ExpectedText2,
    ExpectedText2Eof,
    UnsupportedOperand,
    UnsupportedPredicate,
    TooDeeplyNested,
    Unknown,
    UnknownNoPosition,
}

impl MessageKind {
    pub const ALL: &'static [MessageKind] = &[
        Self::ReservedWord,
        Self::IllegalEscape,
        Self::IllegalEscapeBlank,
        Self::ReservedCharacter,
        Self::IllegalCharacter,
        Self::UnfinishedString,
        Self::UnfinishedStringBlank,
        Self::IllegalNumber,
        Self::EmptyField,
        Self::EmptyFunction,
        Self::NoField,
        Self::NoFieldEof,
        Self::NoCustomField,
        Self::NoOrder,
        Self::NoOrderEof,
        Self::NoOperator,
        Self::NoOperatorEof,
        Self::BadCustomFieldId,
        Self::BadCustomFieldIdEof,
        Self::LogicalOperator,
        Self::LogicalOperatorEof,
        Self::BadOperand,
        Self::BadOperandEof,
        Self::BadFunctionArgument,
        Self::BadFunctionArgumentEof,
        Self::EmptyFunctionArgument,
        Self::BadPropertyArgument,
        Self::ExpectedText,
        Self::ExpectedTextEof,
        Self::ExpectedText2,
        Self::ExpectedText2Eof,
        Self::UnsupportedOperand,
        Self::UnsupportedPredicate,
        Self::TooDeeplyNested,
        Self::Unknown,
        Self::UnknownNoPosition,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::ReservedWord => "jql.parse.reserved.word",
            Self::IllegalEscape => "jql.parse.illegal.escape",
            Self::IllegalEscapeBlank => "jql.parse.illegal.escape.blank",
            Self::ReservedCharacter => "jql.parse.reserved.character",
            Self::IllegalCharacter => "jql.parse.illegal.character",
            Self::UnfinishedString => "jql.parse.unfinished.string",
            Self::UnfinishedStringBlank => "jql.parse.unfinished.string.blank",
            Self::IllegalNumber => "jql.parse.illegal.number",
            Self::EmptyField => "jql.parse.empty.field",
            Self::EmptyFunction => "jql.parse.empty.function",
            Self::NoField => "jql.parse.no.field",
            Self::NoFieldEof => "jql.parse.no.field.eof",
            Self::NoCustomField => "jql.parse.no.cf.field",
            Self::NoOrder => "jql.parse.no.order",
            Self::NoOrderEof => "jql.parse.no.order.eof",
            Self::NoOperator => "jql.parse.no.operator",
            Self::NoOperatorEof => "jql.parse.no.operator.eof",
            Self::BadCustomFieldId => "jql.parse.bad.custom.field.id",
            Self::BadCustomFieldIdEof => "jql.parse.bad.custom.field.id.eof",
            Self::LogicalOperator => "jql.parse.logical.operator",
            Self::LogicalOperatorEof => "jql.parse.logical.operator.eof",
            Self::BadOperand => "jql.parse.bad.operand",
            Self::BadOperandEof => "jql.parse.bad.operand.eof",
            Self::BadFunctionArgument => "jql.parse.bad.function.argument",
            Self::BadFunctionArgumentEof => "jql.parse.bad.function.argument.eof",
            Self::EmptyFunctionArgument => "jql.parse.empty.function.argument",
            Self::BadPropertyArgument => "jql.parse.bad.property.argument",
            Self::ExpectedText => "jql.parse.expected.text",
            Self::ExpectedTextEof => "jql.parse.expected.text.eof",
            Self::ExpectedText2 => "jql.parse.expected.text.2",
            Self::ExpectedText2Eof => "jql.parse.expected.text.2.eof",
            Self::UnsupportedOperand => "jql.parse.unsupported.operand",
            Self::UnsupportedPredicate => "jql.parse.unsupported.predicate",
            Self::TooDeeplyNested => "jql.parse.too.deeply.nested",
            Self::Unknown => "jql.parse.unknown",
            Self::UnknownNoPosition => "jql.parse.unknown.no.pos",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.key() == key)
    }

    /// End-of-input variants never carry a position
    pub const fn is_eof_variant(self) -> bool {
        matches!(
            self,
            Self::NoFieldEof
                | Self::NoOrderEof
                | Self::NoOperatorEof
                | Self::BadCustomFieldIdEof
                | Self::LogicalOperatorEof
                | Self::BadOperandEof
                | Self::BadFunctionArgumentEof
                | Self::ExpectedTextEof
                | Self::ExpectedText2Eof
        )
    }

    /// Log code used when this message is reported
    pub fn error_code(self) -> Code {
        use codes::{lexical, syntax, system};

        match self {
            Self::ReservedWord => syntax::RESERVED_WORD,
            Self::IllegalEscape | Self::IllegalEscapeBlank => lexical::ILLEGAL_ESCAPE,
            Self::ReservedCharacter => lexical::RESERVED_CHARACTER,
            Self::IllegalCharacter => lexical::ILLEGAL_CHARACTER,
            Self::UnfinishedString | Self::UnfinishedStringBlank => lexical::UNFINISHED_STRING,
            Self::IllegalNumber => syntax::ILLEGAL_NUMBER,
            Self::EmptyField | Self::NoField | Self::NoFieldEof | Self::NoCustomField => {
                syntax::BAD_FIELD_NAME
            }
            Self::BadCustomFieldId | Self::BadCustomFieldIdEof => syntax::BAD_CUSTOM_FIELD_ID,
            Self::NoOrder | Self::NoOrderEof => syntax::BAD_SORT_ORDER,
            Self::NoOperator | Self::NoOperatorEof => syntax::BAD_OPERATOR,
            Self::LogicalOperator | Self::LogicalOperatorEof => syntax::MISSING_LOGICAL_OPERATOR,
            Self::BadOperand | Self::BadOperandEof => syntax::BAD_OPERAND,
            Self::EmptyFunction
            | Self::BadFunctionArgument
            | Self::BadFunctionArgumentEof
            | Self::EmptyFunctionArgument => syntax::BAD_FUNCTION_ARGUMENT,
            Self::BadPropertyArgument => syntax::BAD_PROPERTY_ARGUMENT,
            Self::ExpectedText
            | Self::ExpectedTextEof
            | Self::ExpectedText2
            | Self::ExpectedText2Eof => syntax::UNEXPECTED_TOKEN,
            Self::UnsupportedOperand => syntax::UNSUPPORTED_OPERAND,
            Self::UnsupportedPredicate => syntax::UNSUPPORTED_PREDICATE,
            Self::TooDeeplyNested => syntax::MAX_RECURSION_DEPTH,
            Self::Unknown | Self::UnknownNoPosition => system::INTERNAL_ERROR,
        }
    }
}

// === MESSAGE ===

/// The single error produced by a failed parse
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("{key}{}", position_suffix(.line, .column))]
pub struct ParseErrorMessage {
    pub key: String,
    /// 1-based, `-1` when unknown
    pub line: i32,
    /// 1-based, `-1` when unknown
    pub column: i32,
    /// Substitution arguments in placeholder order
    pub args: Vec<String>,
}

fn position_suffix(line: &i32, column: &i32) -> String {
    match (*line > 0, *column > 0) {
        (true, true) => format!(" at {}:{}", line, column),
        (true, false) => format!(" at line {}", line),
        _ => String::new(),
    }
}

impl ParseErrorMessage {
    pub(crate) fn new(kind: MessageKind, position: MessagePosition, args: Vec<String>) -> Self {
        Self {
            key: kind.key().to_string(),
            line: position.line,
            column: position.column,
            args,
        }
    }

    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_key(&self.key)
    }

    pub fn position(&self) -> MessagePosition {
        MessagePosition {
            line: self.line,
            column: self.column,
        }
    }

    pub fn has_position(&self) -> bool {
        self.line > 0
    }

    pub fn error_code(&self) -> Code {
        self.kind()
            .map(MessageKind::error_code)
            .unwrap_or(codes::system::INTERNAL_ERROR)
    }

    /// The key without the shared `jql.parse.` prefix
    pub fn short_key(&self) -> &str {
        self.key.strip_prefix(KEY_PREFIX).unwrap_or(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_position_normalisation() {
        assert_eq!(
            MessagePosition::from_raw(1, 20),
            MessagePosition {
                line: 1,
                column: 21
            }
        );
        assert_eq!(MessagePosition::from_raw(-2, 20).line, -1);
        assert_eq!(MessagePosition::from_raw(-2, 20).column, 21);
        assert_eq!(MessagePosition::from_raw(99, -27387198).column, -1);
        assert_eq!(MessagePosition::from_raw(0, 0).line, -1);
    }

    #[test]
    fn test_position_args() {
        assert_eq!(MessagePosition::from_raw(1, 20).args(), ["1", "21"]);
        assert_eq!(MessagePosition::from_raw(-1, 10).args(), ["?", "?"]);
        assert_eq!(MessagePosition::from_raw(10, -1).args(), ["10", "?"]);
        assert_eq!(MessagePosition::UNKNOWN.args(), ["?", "?"]);
    }

    #[test]
    fn test_keys_are_unique_and_prefixed() {
        let keys: HashSet<&str> = MessageKind::ALL.iter().map(|kind| kind.key()).collect();
        assert_eq!(keys.len(), MessageKind::ALL.len());
        for kind in MessageKind::ALL {
            assert!(kind.key().starts_with(KEY_PREFIX), "{:?}", kind);
            assert_eq!(MessageKind::from_key(kind.key()), Some(*kind));
            assert_eq!(kind.is_eof_variant(), kind.key().ends_with(".eof"));
        }
    }

    #[test]
    fn test_display() {
        let message = ParseErrorMessage::new(
            MessageKind::BadOperand,
            MessagePosition::from_raw(1, 4),
            vec!["1".into(), "5".into(), ")".into()],
        );
        assert_eq!(message.to_string(), "jql.parse.bad.operand at 1:5");
        assert_eq!(message.short_key(), "bad.operand");

        let eof = ParseErrorMessage::new(MessageKind::BadOperandEof, MessagePosition::UNKNOWN, vec![]);
        assert_eq!(eof.to_string(), "jql.parse.bad.operand.eof");
        assert!(!eof.has_position());
        assert_eq!(eof.error_code(), codes::syntax::BAD_OPERAND);
    }
}
