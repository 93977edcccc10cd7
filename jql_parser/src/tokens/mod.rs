//! Token system for query text
//!
//! - **[`Token`]**: a classified lexeme with decoded text and [`Span`](crate::utils::Span)
//! - **[`TokenKind`]**: punctuation, operators, keywords, words, and the
//!   `Error`/`Eof` terminators
//! - **[`TokenStream`]**: cursor with bounded lookahead used by the parser
//!
//! Keyword and reserved-word classification lives in
//! [`crate::grammar::keywords`] so the tokenizer and the fragment
//! validators share one table.

pub mod token;
pub mod token_stream;

pub use token::{StringStyle, Token, TokenKind};
pub use token_stream::TokenStream;
