//! Logging service and logger implementations

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
    enabled: bool,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            logger,
            min_level,
            enabled: true,
        }
    }

    /// Service that drops every event
    pub fn disabled() -> Self {
        Self {
            logger: Arc::new(NullLogger),
            min_level: LogLevel::Error,
            enabled: false,
        }
    }

    /// Create service with configuration-aware settings
    pub fn with_config() -> Self {
        Self::from_preferences(config::runtime_preferences())
    }

    /// Console output is opt-in; structured logging only changes the format
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        if !preferences.enable_console_logging {
            return Self::disabled();
        }

        let min_level = preferences.min_log_level.to_events_log_level();
        let logger: Arc<dyn Logger> = if preferences.use_structured_logging {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger::new(preferences.include_context))
        };

        Self::new(logger, min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        self.enabled && level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }
}

/// Logger that discards events
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Plain-text logger; stdout is left to command output
pub struct ConsoleLogger {
    include_context: bool,
}

impl ConsoleLogger {
    pub fn new(include_context: bool) -> Self {
        Self { include_context }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let line = if self.include_context {
            event.format_with_context()
        } else {
            event.format()
        };
        eprintln!("{}", line);
    }
}

/// Structured logger emitting one JSON object per line on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        // Fall back to the plain format if serialization fails
        let line = event.format_json().unwrap_or_else(|_| event.format());
        eprintln!("{}", line);
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_summary(&self) -> EventSummary {
        let events = self.lock();
        EventSummary {
            total_count: events.len(),
            error_count: events.iter().filter(|e| e.is_error()).count(),
            warning_count: events.iter().filter(|e| e.is_warning()).count(),
            info_count: events.iter().filter(|e| e.is_info()).count(),
            debug_count: events.iter().filter(|e| e.is_debug()).count(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();

        // Respect buffer size limits from config
        let max_events = config::get_event_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

/// Summary of events in memory logger
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }
}

/// Build a service from runtime preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_below_min_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log_error(codes::syntax::BAD_OPERAND, "bad operand");
        service.log_success(codes::success::QUERY_PARSED, "parsed");
        service.log_event(LogEvent::debug("dropped"));

        let summary = memory.get_summary();
        assert_eq!(summary.total_count, 2);
        assert!(summary.has_errors());
        assert!(!summary.has_warnings());
        assert_eq!(summary.debug_count, 0);
    }

    fn preferences(console: bool, structured: bool) -> LoggingPreferences {
        LoggingPreferences {
            use_structured_logging: structured,
            enable_console_logging: console,
            min_log_level: crate::config::runtime::LogLevel::Info,
            include_context: false,
        }
    }

    #[test]
    fn test_console_logging_is_opt_in() {
        let silent = LoggingService::from_preferences(&preferences(false, false));
        assert!(!silent.is_enabled());
        assert!(!silent.should_log(LogLevel::Error));

        let structured_only = LoggingService::from_preferences(&preferences(false, true));
        assert!(!structured_only.should_log(LogLevel::Error));

        let console = LoggingService::from_preferences(&preferences(true, false));
        assert!(console.is_enabled());
        assert!(console.should_log(LogLevel::Info));
        assert!(!console.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_memory_logger_queries() {
        let memory = MemoryLogger::new();
        memory.log(&LogEvent::error(codes::lexical::ILLEGAL_ESCAPE, "escape"));
        memory.log(&LogEvent::success(codes::success::QUERY_PARSED, "ok"));

        assert!(memory.has_error_with_code(codes::lexical::ILLEGAL_ESCAPE));
        assert!(!memory.has_error_with_code(codes::success::QUERY_PARSED));
        assert!(memory.has_success_with_code(codes::success::QUERY_PARSED));
        assert_eq!(memory.get_errors().len(), 1);
        assert_eq!(
            memory
                .get_events_with_code(codes::success::QUERY_PARSED)
                .len(),
            1
        );

        memory.clear();
        assert_eq!(memory.event_count(), 0);
    }

    #[test]
    fn test_memory_logger_respects_buffer_size() {
        let memory = MemoryLogger::new();
        let limit = config::get_event_buffer_size();
        for i in 0..limit + 5 {
            memory.log(&LogEvent::info(&format!("event {}", i)));
        }

        let events = memory.get_events();
        assert_eq!(events.len(), limit);
        assert_eq!(events[0].message, "event 5");
    }
}
