//! Syntax analysis: token stream to query tree
//!
//! [`Grammar`] is a recursive-descent parser that stops at the first
//! error. Errors are [`ParseErrorMessage`] values so the facade can hand
//! them to callers without translation.

mod parser;

pub use parser::Grammar;

use crate::grammar::ast::{Clause, SearchSort};
use crate::messages::ParseErrorMessage;
use crate::tokens::TokenStream;
use crate::log_debug;

pub type SyntaxResult<T> = Result<T, ParseErrorMessage>;

/// Grammar output before it is wrapped into a `Query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub clause: Option<Clause>,
    /// `None` when the query has no ORDER BY
    pub order_by: Option<Vec<SearchSort>>,
}

/// Parse a complete query from its token stream
pub fn parse_tokens(tokens: TokenStream) -> SyntaxResult<ParsedQuery> {
    log_debug!("Starting syntax analysis", "tokens" => tokens.len());
    Grammar::new(tokens).query()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_parse_tokens() {
        let parsed = parse_tokens(tokenize("a = b order by c")).unwrap();
        assert!(parsed.clause.is_some());
        assert_eq!(parsed.order_by.map(|sorts| sorts.len()), Some(1));
        assert_eq!(
            parse_tokens(tokenize("a = ")).unwrap_err().key,
            "jql.parse.bad.operand.eof"
        );
    }
}
