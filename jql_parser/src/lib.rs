//! JQL tokenizer, parser and fragment validators
//!
//! [`parse_query`] turns query text into a [`Query`] tree or a single
//! [`ParseErrorMessage`]. The `is_valid_*` functions check whether a
//! fragment can be written bare in a query.

pub mod batch;
pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod messages;
pub mod query_parser;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use batch::{BatchConfig, BatchError, BatchReport};
pub use grammar::ast::{Clause, OrderBy, Query};
pub use messages::ParseErrorMessage;
pub use query_parser::{
    is_valid_field_name, is_valid_function_argument, is_valid_function_name, is_valid_value,
    parse_query, QueryParser,
};
