//! Grammar definitions for JQL

pub mod ast;
pub mod keywords;
pub mod rules;

// Re-export AST types
pub use ast::*;

// Re-export keywords
pub use keywords::{is_reserved_word, Keyword};
