//! Lexical analysis for query text
//!
//! A [`Tokenizer`] is created per query and consumed by
//! [`Tokenizer::tokenize`]; nothing is shared between calls.

pub mod analyzer;

use crate::tokens::TokenStream;

pub use analyzer::{
    is_illegal_character, is_noncharacter, is_token_whitespace, is_word_break, LexerError,
    Tokenizer,
};

/// Tokenize a complete query
pub fn tokenize(source: &str) -> TokenStream {
    Tokenizer::new(source).tokenize()
}
