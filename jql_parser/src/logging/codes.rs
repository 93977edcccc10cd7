//! Consolidated log codes and classification system
//!
//! Single source of truth for all error and success codes emitted by the
//! parser, together with their behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR002");
}

/// Tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const ILLEGAL_CHARACTER: Code = Code::new("E020");
    pub const RESERVED_CHARACTER: Code = Code::new("E021");
    pub const ILLEGAL_ESCAPE: Code = Code::new("E022");
    pub const UNFINISHED_STRING: Code = Code::new("E023");
    pub const QUERY_TOO_LONG: Code = Code::new("E024");
    pub const TOO_MANY_TOKENS: Code = Code::new("E025");
}

/// Grammar error codes
pub mod syntax {
    use super::Code;

    pub const RESERVED_WORD: Code = Code::new("E040");
    pub const BAD_FIELD_NAME: Code = Code::new("E041");
    pub const BAD_OPERATOR: Code = Code::new("E042");
    pub const BAD_OPERAND: Code = Code::new("E043");
    pub const MISSING_LOGICAL_OPERATOR: Code = Code::new("E044");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E045");
    pub const BAD_FUNCTION_ARGUMENT: Code = Code::new("E046");
    pub const BAD_CUSTOM_FIELD_ID: Code = Code::new("E047");
    pub const BAD_PROPERTY_ARGUMENT: Code = Code::new("E048");
    pub const ILLEGAL_NUMBER: Code = Code::new("E049");
    pub const BAD_SORT_ORDER: Code = Code::new("E050");
    pub const UNSUPPORTED_OPERAND: Code = Code::new("E060");
    pub const UNSUPPORTED_PREDICATE: Code = Code::new("E061");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Batch validation error codes
pub mod batch {
    use super::Code;

    pub const IO_ERROR: Code = Code::new("E100");
    pub const TOO_MANY_QUERIES: Code = Code::new("E101");
    pub const QUERY_REJECTED: Code = Code::new("E102");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const QUERY_PARSED: Code = Code::new("I040");
    pub const BATCH_COMPLETED: Code = Code::new("I100");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn register(
    registry: &mut HashMap<&'static str, ErrorMetadata>,
    code: Code,
    category: &'static str,
    severity: Severity,
    recoverable: bool,
    description: &'static str,
    recommended_action: &'static str,
) {
    registry.insert(
        code.as_str(),
        ErrorMetadata {
            code: code.as_str(),
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        },
    );
}

#[rustfmt::skip]
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut r = HashMap::new();

        // System
        register(&mut r, system::INTERNAL_ERROR, "System", Severity::Critical, false,
            "Unexpected internal parser fault",
            "File a bug report with the offending query");
        register(&mut r, system::CONFIGURATION_ERROR, "System", Severity::High, false,
            "Runtime configuration could not be loaded",
            "Check the configuration file and JQL_* environment variables");

        // Lexical
        register(&mut r, lexical::ILLEGAL_CHARACTER, "Lexical", Severity::Medium, true,
            "Character is not allowed in a query",
            "Remove the character or escape it inside a quoted string");
        register(&mut r, lexical::RESERVED_CHARACTER, "Lexical", Severity::Medium, true,
            "Reserved character used outside a quoted string",
            "Quote the text that contains the character");
        register(&mut r, lexical::ILLEGAL_ESCAPE, "Lexical", Severity::Medium, true,
            "Unknown or incomplete escape sequence",
            "Use one of \\n \\r \\t \\\" \\' \\\\ \\<space> or \\uXXXX");
        register(&mut r, lexical::UNFINISHED_STRING, "Lexical", Severity::Medium, true,
            "Quoted string is not terminated",
            "Add the closing quote");
        register(&mut r, lexical::QUERY_TOO_LONG, "Lexical", Severity::High, true,
            "Query exceeds the configured maximum length",
            "Shorten the query");
        register(&mut r, lexical::TOO_MANY_TOKENS, "Lexical", Severity::High, true,
            "Query exceeds the configured maximum token count",
            "Simplify the query");

        // Syntax
        register(&mut r, syntax::RESERVED_WORD, "Syntax", Severity::Medium, true,
            "Reserved word used as a name or value",
            "Quote the word");
        register(&mut r, syntax::BAD_FIELD_NAME, "Syntax", Severity::Medium, true,
            "Missing or malformed field name",
            "Start the clause with a field name");
        register(&mut r, syntax::BAD_OPERATOR, "Syntax", Severity::Medium, true,
            "Missing or unknown operator",
            "Use one of = != ~ !~ < <= > >= IN IS WAS CHANGED");
        register(&mut r, syntax::BAD_OPERAND, "Syntax", Severity::Medium, true,
            "Missing or malformed operand",
            "Provide a value, list or function after the operator");
        register(&mut r, syntax::MISSING_LOGICAL_OPERATOR, "Syntax", Severity::Medium, true,
            "Clauses are not joined by AND or OR",
            "Join the clauses with AND or OR");
        register(&mut r, syntax::UNEXPECTED_TOKEN, "Syntax", Severity::Medium, true,
            "Expected text was not found",
            "Insert the expected text");
        register(&mut r, syntax::BAD_FUNCTION_ARGUMENT, "Syntax", Severity::Medium, true,
            "Missing or malformed function argument",
            "Separate arguments with commas and quote special text");
        register(&mut r, syntax::BAD_CUSTOM_FIELD_ID, "Syntax", Severity::Medium, true,
            "Custom field id is not a positive number",
            "Use cf[<digits>]");
        register(&mut r, syntax::BAD_PROPERTY_ARGUMENT, "Syntax", Severity::Medium, true,
            "Malformed property reference",
            "Use field[key].path");
        register(&mut r, syntax::ILLEGAL_NUMBER, "Syntax", Severity::Medium, true,
            "Number is outside the signed 64-bit range",
            "Quote the number to search for it as text");
        register(&mut r, syntax::BAD_SORT_ORDER, "Syntax", Severity::Medium, true,
            "Unknown sort direction",
            "Use ASC or DESC");
        register(&mut r, syntax::UNSUPPORTED_OPERAND, "Syntax", Severity::Medium, true,
            "Operand shape is not supported by the operator",
            "Change the operator or the operand");
        register(&mut r, syntax::UNSUPPORTED_PREDICATE, "Syntax", Severity::Medium, true,
            "History predicate is not supported by the operator",
            "Use predicates only after WAS or CHANGED");
        register(&mut r, syntax::MAX_RECURSION_DEPTH, "Syntax", Severity::High, true,
            "Query is nested too deeply",
            "Remove redundant parentheses or NOT operators");

        // Batch
        register(&mut r, batch::IO_ERROR, "Batch", Severity::High, false,
            "Query file could not be read",
            "Check the path and permissions");
        register(&mut r, batch::TOO_MANY_QUERIES, "Batch", Severity::High, false,
            "Query file exceeds the configured maximum number of queries",
            "Split the file");
        register(&mut r, batch::QUERY_REJECTED, "Batch", Severity::Low, true,
            "A query in the batch failed to parse",
            "Inspect the per-line report");

        // Success
        register(&mut r, success::SYSTEM_INITIALIZATION_COMPLETED, "Success", Severity::Low, true,
            "Logging initialised", "None");
        register(&mut r, success::TOKENIZATION_COMPLETE, "Success", Severity::Low, true,
            "Query tokenized", "None");
        register(&mut r, success::QUERY_PARSED, "Success", Severity::Low, true,
            "Query parsed", "None");
        register(&mut r, success::BATCH_COMPLETED, "Success", Severity::Low, true,
            "Batch validation finished", "None");

        r
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_is_registered() {
        let codes = [
            system::INTERNAL_ERROR,
            lexical::ILLEGAL_CHARACTER,
            lexical::UNFINISHED_STRING,
            syntax::BAD_OPERAND,
            syntax::UNSUPPORTED_PREDICATE,
            syntax::MAX_RECURSION_DEPTH,
            batch::QUERY_REJECTED,
            success::QUERY_PARSED,
        ];
        for code in codes {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "{} missing", code);
            assert_eq!(metadata.map(|m| m.code), Some(code.as_str()));
        }
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E020"), "Lexical");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(!is_recoverable("ERR001"));
        assert!(is_recoverable("E043"));
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_action("E999"), "No specific action available");
        assert_eq!(get_severity("E999"), Severity::Medium);
    }
}
