//! Batch validation of query files
//!
//! A query file holds one query per line. Blank lines are ignored and,
//! unless disabled, so are lines starting with `--`. Queries are parsed
//! on a scoped worker pool and reported in input order.

use crate::config::compile_time::batch_processing::{MAX_QUERIES_PER_FILE, MAX_WORKER_THREADS};
use crate::config::runtime::{BatchPreferences, ParserPreferences};
use crate::grammar::ast::Query;
use crate::logging::{codes, Code};
use crate::messages::ParseErrorMessage;
use crate::query_parser::QueryParser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub worker_threads: usize,
    pub stop_on_first_error: bool,
    pub skip_comment_lines: bool,
    pub max_queries: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

impl BatchConfig {
    /// Worker count is clamped to `1..=MAX_WORKER_THREADS`
    pub fn from_preferences(preferences: &BatchPreferences) -> Self {
        Self {
            worker_threads: preferences.worker_threads.clamp(1, MAX_WORKER_THREADS),
            stop_on_first_error: preferences.stop_on_first_error,
            skip_comment_lines: preferences.skip_comment_lines,
            max_queries: MAX_QUERIES_PER_FILE,
        }
    }
}

/// What happened to one query line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineOutcome {
    Parsed(Query),
    Failed(ParseErrorMessage),
    /// Not attempted because an earlier query failed
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    /// 1-based line in the file
    pub line_number: usize,
    pub text: String,
    pub outcome: LineOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub path: Option<PathBuf>,
    pub lines: Vec<LineReport>,
    #[serde(skip)]
    pub duration: Duration,
}

impl BatchReport {
    fn count(&self, predicate: impl Fn(&LineOutcome) -> bool) -> usize {
        self.lines.iter().filter(|line| predicate(&line.outcome)).count()
    }

    pub fn parsed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LineOutcome::Parsed(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LineOutcome::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LineOutcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0 && self.skipped_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&LineReport, &ParseErrorMessage)> {
        self.lines.iter().filter_map(|line| match &line.outcome {
            LineOutcome::Failed(error) => Some((line, error)),
            _ => None,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} queries: {} parsed, {} failed, {} skipped in {:.2}ms",
            self.lines.len(),
            self.parsed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.duration.as_secs_f64() * 1000.0
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read query file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Too many queries: {count} (max: {max})")]
    TooManyQueries { count: usize, max: usize },

    #[error("Worker thread panicked while parsing")]
    WorkerPanicked,
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::Io { .. } => codes::batch::IO_ERROR,
            BatchError::TooManyQueries { .. } => codes::batch::TOO_MANY_QUERIES,
            BatchError::WorkerPanicked => codes::system::INTERNAL_ERROR,
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// Query lines with their 1-based line numbers
pub fn collect_queries(content: &str, skip_comment_lines: bool) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !(skip_comment_lines && trimmed.starts_with("--"))
        })
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect()
}

// ============================================================================
// VALIDATION
// ============================================================================

pub fn validate_file(path: &Path, config: &BatchConfig) -> Result<BatchReport, BatchError> {
    crate::log_info!("Validating query file", "file" => path.display());

    let content = std::fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut report = validate_text(&content, config)?;
    report.path = Some(path.to_path_buf());
    Ok(report)
}

/// Validate queries held in memory, one per line
pub fn validate_text(content: &str, config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let start = Instant::now();
    let queries = collect_queries(content, config.skip_comment_lines);

    if queries.len() > config.max_queries {
        let error = BatchError::TooManyQueries {
            count: queries.len(),
            max: config.max_queries,
        };
        crate::log_error!(error.error_code(), "Query file rejected",
            "count" => queries.len(),
            "max" => config.max_queries
        );
        return Err(error);
    }

    let outcomes = run_workers(&queries, config)?;
    let lines: Vec<LineReport> = queries
        .into_iter()
        .zip(outcomes)
        .map(|((line_number, text), outcome)| LineReport {
            line_number,
            text,
            outcome,
        })
        .collect();

    let report = BatchReport {
        path: None,
        lines,
        duration: start.elapsed(),
    };

    for (line, error) in report.failures() {
        crate::log_warning!(codes::batch::QUERY_REJECTED, "Query failed to parse",
            "line" => line.line_number,
            "key" => &error.key
        );
    }

    crate::log_success!(
        codes::success::BATCH_COMPLETED,
        "Batch validation completed",
        "queries" => report.lines.len(),
        "parsed" => report.parsed_count(),
        "failed" => report.failed_count(),
        "duration_ms" => format!("{:.2}", report.duration.as_secs_f64() * 1000.0)
    );

    Ok(report)
}

/// Parse every query; entries are in the same order as `queries`
fn run_workers(
    queries: &[(usize, String)],
    config: &BatchConfig,
) -> Result<Vec<LineOutcome>, BatchError> {
    // Batch reports carry their own failures
    let parser = QueryParser::with_preferences(ParserPreferences {
        log_parse_events: false,
        log_parse_failures: false,
    });
    let next = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let workers = config.worker_threads.clamp(1, MAX_WORKER_THREADS).min(queries.len().max(1));

    crate::log_debug!("Starting batch workers",
        "queries" => queries.len(),
        "workers" => workers
    );

    let parsed: Vec<Vec<(usize, LineOutcome)>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    while !stop.load(Ordering::Acquire) {
                        let index = next.fetch_add(1, Ordering::AcqRel);
                        let Some((_, text)) = queries.get(index) else {
                            break;
                        };
                        let outcome = match parser.parse(text) {
                            Ok(query) => LineOutcome::Parsed(query),
                            Err(error) => {
                                if config.stop_on_first_error {
                                    stop.store(true, Ordering::Release);
                                }
                                LineOutcome::Failed(error)
                            }
                        };
                        done.push((index, outcome));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| BatchError::WorkerPanicked))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut outcomes = vec![LineOutcome::Skipped; queries.len()];
    for (index, outcome) in parsed.into_iter().flatten() {
        outcomes[index] = outcome;
    }

    // Workers may race past the first failure; the report does not
    if config.stop_on_first_error {
        if let Some(first) = outcomes
            .iter()
            .position(|outcome| matches!(outcome, LineOutcome::Failed(_)))
        {
            outcomes[first + 1..].fill(LineOutcome::Skipped);
        }
    }
    Ok(outcomes)
}
