//! Shared primitive types used by the tokenizer, parser and message factory.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
