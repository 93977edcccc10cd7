// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Whether the facade emits debug/success events for every parse
    pub log_parse_events: bool,

    /// Whether failed parses are logged as errors (validators never log)
    pub log_parse_failures: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            log_parse_events: env::var("JQL_PARSER_LOG_EVENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_parse_failures: env::var("JQL_PARSER_LOG_FAILURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads used for batch validation (capped by the compile-time limit)
    pub worker_threads: usize,

    /// Whether to stop scheduling new queries once one fails
    pub stop_on_first_error: bool,

    /// Whether lines starting with `--` are treated as comments
    pub skip_comment_lines: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            worker_threads: env::var("JQL_BATCH_WORKER_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            stop_on_first_error: env::var("JQL_BATCH_STOP_ON_FIRST_ERROR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            skip_comment_lines: env::var("JQL_BATCH_SKIP_COMMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether context pairs are included in console output
    pub include_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("JQL_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("JQL_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("JQL_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_context: env::var("JQL_LOGGING_INCLUDE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parser: ParserPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections fall back to environment defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const PARSER_LOG_EVENTS: &str = "JQL_PARSER_LOG_EVENTS";
    pub const PARSER_LOG_FAILURES: &str = "JQL_PARSER_LOG_FAILURES";

    // Batch
    pub const BATCH_WORKER_THREADS: &str = "JQL_BATCH_WORKER_THREADS";
    pub const BATCH_STOP_ON_FIRST_ERROR: &str = "JQL_BATCH_STOP_ON_FIRST_ERROR";
    pub const BATCH_SKIP_COMMENTS: &str = "JQL_BATCH_SKIP_COMMENTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "JQL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "JQL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "JQL_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_CONTEXT: &str = "JQL_LOGGING_INCLUDE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_partial_toml_keeps_other_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [batch]
            worker_threads = 2
            stop_on_first_error = true

            [logging]
            min_log_level = "Debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch.worker_threads, 2);
        assert!(config.batch.stop_on_first_error);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nlog_parse_events = false").unwrap();

        let config = RuntimeConfig::load_from_file(file.path()).unwrap();
        assert!(!config.parser.log_parse_events);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = RuntimeConfig::load_from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("JQL_"));
        assert!(env_vars::BATCH_WORKER_THREADS.starts_with("JQL_"));
    }
}
