//! Query parser facade
//!
//! Every call tokenizes and parses with its own [`Tokenizer`] and
//! [`Grammar`], so the functions here may be used from any number of
//! threads at once. The only shared state is the logger.

use crate::config::compile_time::{lexical, syntax as syntax_limits};
use crate::config::runtime::ParserPreferences;
use crate::grammar::ast::{OrderBy, Query};
use crate::lexical::{is_token_whitespace, Tokenizer};
use crate::logging::codes;
use crate::messages::ParseErrorMessage;
use crate::syntax::{self, Grammar, SyntaxResult};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::sync::OnceLock;

/// Limits compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParserLimits {
    pub max_query_length: usize,
    pub max_token_count: usize,
    pub max_parse_depth: usize,
}

/// Parser handle carrying logging preferences
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    preferences: ParserPreferences,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: ParserPreferences) -> Self {
        Self { preferences }
    }

    /// Handle used by the free functions; preferences are read once
    pub fn shared() -> &'static QueryParser {
        static SHARED: OnceLock<QueryParser> = OnceLock::new();
        SHARED.get_or_init(QueryParser::new)
    }

    pub fn preferences(&self) -> &ParserPreferences {
        &self.preferences
    }

    pub fn limits(&self) -> ParserLimits {
        ParserLimits {
            max_query_length: lexical::MAX_QUERY_LENGTH,
            max_token_count: lexical::MAX_TOKEN_COUNT,
            max_parse_depth: syntax_limits::MAX_PARSE_DEPTH,
        }
    }

    /// Parse a complete query. A query without ORDER BY gets
    /// [`OrderBy::Default`].
    pub fn parse(&self, text: &str) -> Result<Query, ParseErrorMessage> {
        if self.preferences.log_parse_events {
            log_debug!("Parsing query", "length" => text.len());
        }

        let tokens = Tokenizer::new(text).tokenize();
        match syntax::parse_tokens(tokens) {
            Ok(parsed) => {
                let query = Query {
                    clause: parsed.clause,
                    order_by: parsed.order_by.map(OrderBy::Explicit).unwrap_or_default(),
                    raw_text: text.to_string(),
                };
                if self.preferences.log_parse_events {
                    log_success!(codes::success::QUERY_PARSED, "Query parsed",
                        "clauses" => query.clause.as_ref().map_or(0, |clause| clause.leaf_count()),
                        "sorts" => query.order_by.sorts().len()
                    );
                }
                Ok(query)
            }
            Err(error) => {
                if self.preferences.log_parse_failures {
                    log_error!(error.error_code(), "Query parse failed",
                        "key" => &error.key,
                        "line" => error.line,
                        "column" => error.column
                    );
                }
                Err(error)
            }
        }
    }

    /// A field name, `cf[N]` included
    pub fn is_valid_field_name(&self, name: &str) -> bool {
        is_custom_field_id(name) || consumes_exactly(name, |grammar| grammar.field_check())
    }

    pub fn is_valid_function_name(&self, name: &str) -> bool {
        consumes_exactly(name, |grammar| grammar.function_name_check())
    }

    pub fn is_valid_function_argument(&self, argument: &str) -> bool {
        consumes_exactly(argument, |grammar| grammar.argument_check())
    }

    /// Any 64-bit integer is a valid value
    pub fn is_valid_value(&self, value: &str) -> bool {
        value.parse::<i64>().is_ok() || consumes_exactly(value, |grammar| grammar.value_check())
    }
}

/// `cf[` digits `]` with nothing around it
fn is_custom_field_id(text: &str) -> bool {
    let digits = text
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("cf["))
        .and_then(|_| text[3..].strip_suffix(']'));
    matches!(digits, Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// The narrow entry must accept the text, and the text may not begin
/// or end with whitespace no token would cover.
fn consumes_exactly<T>(text: &str, entry: impl FnOnce(&mut Grammar) -> SyntaxResult<T>) -> bool {
    if text.is_empty() || text.starts_with(is_token_whitespace) || text.ends_with(is_token_whitespace)
    {
        return false;
    }
    let mut grammar = Grammar::new(Tokenizer::new(text).tokenize());
    entry(&mut grammar).is_ok()
}

// === FREE FUNCTIONS ===

pub fn parse_query(text: &str) -> Result<Query, ParseErrorMessage> {
    QueryParser::shared().parse(text)
}

pub fn is_valid_field_name(name: &str) -> bool {
    QueryParser::shared().is_valid_field_name(name)
}

pub fn is_valid_function_name(name: &str) -> bool {
    QueryParser::shared().is_valid_function_name(name)
}

pub fn is_valid_function_argument(argument: &str) -> bool {
    QueryParser::shared().is_valid_function_argument(argument)
}

pub fn is_valid_value(value: &str) -> bool {
    QueryParser::shared().is_valid_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::*;
    use crate::grammar::keywords::reserved_words;
    use crate::logging::{events::LogLevel, init_global_logging_with_service, LoggingService, MemoryLogger};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn good_names() -> Vec<&'static str> {
        vec!["nicename", "102748", "niceunicodename\u{3737}"]
    }

    fn bad_names() -> Vec<String> {
        let mut bad: Vec<String> = [
            "namewith\\bslash",
            "\\namewithbcontrol",
            "bad name spaces",
            "badnamewithescapes\n",
            "badnamewithescapes\\u5775",
            "'badnamewithsquote",
            "\"badnamewithquote",
            "badescape\\k",
            "badquote\"name",
            "badsinglequote'name",
            "",
            " ",
            "cf[ 38",
            "cf[aaa]",
            "cf[-1232]",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for ch in ['{', '}', '*', '/', '%', '+', '^', '$', '#', '@', '?', ';', '\u{fdd0}', '\u{1}'] {
            bad.push(format!("String{}withillegalchar", ch));
        }
        bad.extend(reserved_words().iter().map(|word| word.to_string()));
        bad
    }

    #[test]
    fn test_empty_query_means_everything() {
        let query = parse_query("").unwrap();
        assert_eq!(query.clause, None);
        assert_eq!(query.order_by, OrderBy::Default);
        assert_eq!(query.to_string(), "");
    }

    #[test]
    fn test_order_by_only() {
        let query = parse_query("order by key desc").unwrap();
        assert_eq!(query.clause, None);
        assert_eq!(query.order_by.sorts().len(), 1);
        assert_eq!(query.raw_text, "order by key desc");
    }

    #[test]
    fn test_round_trip_through_rendering() {
        let queries = [
            "priority = qwerty",
            "a = 1 OR b = 2 AND c = 3",
            "(a = 1 OR b = 2) AND NOT c = 3",
            "NOT NOT a = b",
            "project in (FOO, \"with space\", 10, (nested, list)) order by created DESC, key",
            "summary ~ \"tab\\there\" and description !~ 'new\\nline'",
            "cf[1234] >= -5 and issue.property[key].a.b = value",
            "assignee = currentUser() and reporter in membersOf(\"jira users\", 10)",
            "status was not in (Open, Closed) after startOfDay(-1) by jsmith",
            "status changed from open to closed during ('2020-01-01', now())",
            "resolution is empty or fixVersion is not null",
            "\"select\" = \"and\" and \"during\" = x",
            "a = '' and b = \"\"",
            "order by cf[10] asc",
        ];
        for text in queries {
            let query = parse_query(text).unwrap();
            let rendered = query.to_string();
            let reparsed = parse_query(&rendered)
                .unwrap_or_else(|error| panic!("{:?} rendered as {:?}: {}", text, rendered, error));
            assert!(query.same_structure(&reparsed), "{:?} rendered as {:?}", text, rendered);
        }
    }

    #[test]
    fn test_precedence_and_implicit_and() {
        assert_matches!(
            parse_query("a = 1 OR b = 2 AND c = 3").unwrap().clause,
            Some(Clause::Or { children }) if matches!(children[1], Clause::And { .. })
        );
        assert!(parse_query("project = FOO status = Open")
            .unwrap()
            .same_structure(&parse_query("project = FOO AND status = Open").unwrap()));
    }

    #[test]
    fn test_numeric_boundary() {
        assert!(parse_query("a = 9223372036854775807").is_ok());
        let error = parse_query("a = 9223372036854775808").unwrap_err();
        assert_eq!(error.key, "jql.parse.illegal.number");
        assert_eq!(&error.args[3..], ["-9223372036854775808", "9223372036854775807"]);
    }

    #[test]
    fn test_eof_specific_operand_error() {
        let error = parse_query("project =").unwrap_err();
        assert_eq!(error.key, "jql.parse.bad.operand.eof");
        assert_eq!((error.line, error.column), (-1, -1));
        assert!(error.args.is_empty());
    }

    #[test]
    fn test_unterminated_string_points_at_quote() {
        let error = parse_query("summary ~ \"unterminated").unwrap_err();
        assert_eq!(error.key, "jql.parse.unfinished.string");
        assert_eq!((error.line, error.column), (1, 11));
        assert_eq!(error.to_string(), "jql.parse.unfinished.string at 1:11");
    }

    #[test]
    fn test_positions_stay_inside_input() {
        let inputs = ["a = b\nand\n", "x\n=\n(\n\n", "f\n = \n \n abc *", "a\n\n\n = b c", "cf[\n12"];
        for text in inputs {
            let error = parse_query(text).unwrap_err();
            let lines: Vec<&str> = text.split('\n').collect();
            if error.line > 0 {
                assert!(error.line as usize <= lines.len(), "{:?}", text);
                let line = lines[error.line as usize - 1];
                assert!(error.column as usize <= line.chars().count() + 1, "{:?}", text);
            }
        }
    }

    #[test]
    fn test_oversized_query_is_rejected_without_position() {
        let limits = QueryParser::shared().limits();
        let text = format!("a = {}", "x".repeat(limits.max_query_length));
        let error = parse_query(&text).unwrap_err();
        assert_eq!(error.key, "jql.parse.unknown.no.pos");
        assert!(!error.has_position());
    }

    #[test]
    fn test_validators_accept_good_names() {
        for name in good_names() {
            assert!(is_valid_field_name(name), "{:?}", name);
            assert!(is_valid_function_name(name), "{:?}", name);
            assert!(is_valid_function_argument(name), "{:?}", name);
            assert!(is_valid_value(name), "{:?}", name);
        }
        for name in ["cf[4784]", "cf [4784]", "cf[000001]", "8543859843095843098540938398493"] {
            assert!(is_valid_field_name(name), "{:?}", name);
        }
        assert!(is_valid_function_name("8543859843095843098540938398493"));
        assert!(is_valid_function_argument("8543859843095843098540938398493"));
        assert!(is_valid_value("-9223372036854775808"));
    }

    #[test]
    fn test_validators_reject_bad_names() {
        for name in bad_names() {
            assert!(!is_valid_field_name(&name), "{:?}", name);
            assert!(!is_valid_function_name(&name), "{:?}", name);
            assert!(!is_valid_function_argument(&name), "{:?}", name);
            assert!(!is_valid_value(&name), "{:?}", name);
        }
        assert!(!is_valid_function_argument("cf[9202]"));
        assert!(!is_valid_function_name("cf[27483]"));
        assert!(!is_valid_value("cf[1]"));
        assert!(!is_valid_value("8543859843095843098540938398493"));
    }

    #[test]
    fn test_validators_agree_with_field_entry() {
        for text in ["abc", "cf[12]", "a.b[c]", "a b", "\"quoted\"", "cf[x]", "and"] {
            let direct = Grammar::new(Tokenizer::new(text).tokenize())
                .field_check()
                .is_ok();
            assert_eq!(is_valid_field_name(text), direct, "{:?}", text);
        }
    }

    #[test]
    fn test_concurrent_parsing() {
        let queries: Vec<String> = (0..64).map(|i| format!("field{} = value{} order by f{}", i, i, i)).collect();
        std::thread::scope(|scope| {
            for chunk in queries.chunks(8) {
                scope.spawn(move || {
                    for text in chunk {
                        let query = parse_query(text).unwrap();
                        assert_eq!(&query.raw_text, text);
                        assert!(is_valid_field_name("abc"));
                        assert!(parse_query("a = ").is_err());
                    }
                });
            }
        });
    }

    #[test]
    fn test_parse_events_are_logged() {
        let memory = Arc::new(MemoryLogger::new());
        let service = Arc::new(LoggingService::new(memory.clone(), LogLevel::Debug));
        if init_global_logging_with_service(service).is_err() {
            // Another logger is installed; nothing to observe here
            return;
        }

        let parser = QueryParser::with_preferences(ParserPreferences {
            log_parse_events: true,
            log_parse_failures: true,
        });
        parser.parse("a = b AND c = d order by e").unwrap();
        parser.parse("a = ").unwrap_err();

        assert!(memory.has_success_with_code(codes::success::QUERY_PARSED));
        assert!(memory.has_error_with_code(codes::syntax::BAD_OPERAND));
        let parsed = memory.get_events_with_code(codes::success::QUERY_PARSED);
        assert!(parsed.iter().any(|event| event.context.get("clauses").map(String::as_str) == Some("2")
            && event.context.get("sorts").map(String::as_str) == Some("1")));
    }

    #[test]
    fn test_limits_match_compiled_constants() {
        let limits = QueryParser::new().limits();
        assert_eq!(limits.max_parse_depth, syntax_limits::MAX_PARSE_DEPTH);
        assert!(limits.max_token_count > 0);
    }
}
