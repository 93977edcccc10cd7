use jql_parser::utils::SourceMap;
use jql_parser::{batch, logging, query_parser};
use serde_json::json;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Field,
    Function,
    Argument,
    Value,
}

impl CheckKind {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "field" => Some(Self::Field),
            "function" => Some(Self::Function),
            "argument" => Some(Self::Argument),
            "value" => Some(Self::Value),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Function => "function",
            Self::Argument => "argument",
            Self::Value => "value",
        }
    }

    fn run(self, text: &str) -> bool {
        match self {
            Self::Field => query_parser::is_valid_field_name(text),
            Self::Function => query_parser::is_valid_function_name(text),
            Self::Argument => query_parser::is_valid_function_argument(text),
            Self::Value => query_parser::is_valid_value(text),
        }
    }
}

#[derive(Debug)]
enum Command {
    Help,
    Parse(String),
    File {
        path: PathBuf,
        config: batch::BatchConfig,
    },
    Check {
        kind: CheckKind,
        text: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("jql");

    let command = match parse_args(&args[1.min(args.len())..]) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Run '{} --help' for usage", program);
            std::process::exit(2);
        }
    };

    let ok = match command {
        Command::Help => {
            print_help(program);
            true
        }
        Command::Parse(text) => run_parse(&text)?,
        Command::File { path, config } => run_file(&path, &config)?,
        Command::Check { kind, text } => {
            let valid = kind.run(&text);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "check": kind.as_str(),
                    "text": text,
                    "valid": valid,
                }))?
            );
            valid
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn print_help(program: &str) {
    println!("JQL parser v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenize, parse and validate structured issue queries");
    println!();
    println!("USAGE:");
    println!("    {} <query>                          # Parse one query", program);
    println!("    {} --file <path> [options]          # Validate a query file", program);
    println!("    {} --check <kind> <text>            # Run a validator", program);
    println!();
    println!("CHECK KINDS:");
    println!("    field, function, argument, value");
    println!();
    println!("FILE OPTIONS:");
    println!("    --threads N         Worker threads (default from JQL_BATCH_WORKER_THREADS)");
    println!("    --fail-fast         Stop scheduling queries after the first failure");
    println!("    --keep-comments     Parse lines starting with -- as queries");
    println!();
    println!("OUTPUT:");
    println!("    Parsed queries and errors are printed as JSON on stdout.");
    println!("    Failed parses also print the offending line with a caret on stderr.");
    println!();
    let limits = query_parser::QueryParser::shared().limits();
    println!("LIMITS ({}):", jql_parser::config::build_info::source_info());
    println!("    Max query length: {}", limits.max_query_length);
    println!("    Max tokens:       {}", limits.max_token_count);
    println!("    Max depth:        {}", limits.max_parse_depth);
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Err("missing query".to_string());
    };

    match first.as_str() {
        "--help" | "-h" => Ok(Command::Help),
        "--check" => {
            let kind = args.get(1).ok_or("--check requires a kind")?;
            let kind = CheckKind::from_arg(kind).ok_or_else(|| format!("unknown check kind '{}'", kind))?;
            let text = args.get(2).ok_or("--check requires text")?;
            if args.len() > 3 {
                return Err(format!("unexpected argument '{}'", args[3]));
            }
            Ok(Command::Check {
                kind,
                text: text.clone(),
            })
        }
        "--file" => {
            let path = args.get(1).ok_or("--file requires a path")?;
            let config = parse_batch_options(&args[2..])?;
            Ok(Command::File {
                path: PathBuf::from(path),
                config,
            })
        }
        _ if args.len() == 1 => Ok(Command::Parse(first.clone())),
        _ => Err(format!("unexpected argument '{}'; quote the query", args[1])),
    }
}

fn parse_batch_options(args: &[String]) -> Result<batch::BatchConfig, String> {
    let mut config = batch::BatchConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--threads" => {
                let value = args.get(i + 1).ok_or("--threads requires a number")?;
                let threads = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid thread count '{}'", value))?;
                config.worker_threads = threads.clamp(
                    1,
                    jql_parser::config::compile_time::batch_processing::MAX_WORKER_THREADS,
                );
                i += 1;
            }
            "--fail-fast" => {
                config.stop_on_first_error = true;
            }
            "--keep-comments" => {
                config.skip_comment_lines = false;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok(config)
}

fn run_parse(text: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let output = render_parse(text)?;
    println!("{}", output.stdout);
    if let Some(diagnostic) = output.stderr {
        eprint!("{}", diagnostic);
    }
    Ok(output.ok)
}

/// What a single-query run writes to each stream
struct ParseOutput {
    ok: bool,
    stdout: String,
    stderr: Option<String>,
}

fn render_parse(text: &str) -> Result<ParseOutput, serde_json::Error> {
    match query_parser::parse_query(text) {
        Ok(query) => {
            let output = json!({
                "query": query,
                "canonical": query.to_string(),
            });
            Ok(ParseOutput {
                ok: true,
                stdout: serde_json::to_string_pretty(&output)?,
                stderr: None,
            })
        }
        Err(error) => {
            let source = SourceMap::new(text.to_string());
            Ok(ParseOutput {
                ok: false,
                stdout: serde_json::to_string_pretty(&json!({ "error": error }))?,
                stderr: Some(source.format_error(error.line, error.column, &error.to_string())),
            })
        }
    }
}

fn run_file(
    path: &std::path::Path,
    config: &batch::BatchConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let report = match batch::validate_file(path, config) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            return Ok(false);
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    for (line, error) in report.failures() {
        let source = SourceMap::new(line.text.clone());
        let message = format!("{} (line {} of {})", error, line.line_number, path.display());
        eprint!("{}", source.format_error(error.line, error.column, &message));
    }
    eprintln!("{}", report.summary());

    Ok(report.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_single_query() {
        assert_matches!(
            parse_args(&args(&["project = FOO"])),
            Ok(Command::Parse(text)) if text == "project = FOO"
        );
        assert!(parse_args(&args(&["project", "=", "FOO"])).is_err());
        assert!(parse_args(&[]).is_err());
    }

    #[test]
    fn test_check_command() {
        assert_matches!(
            parse_args(&args(&["--check", "value", "-12"])),
            Ok(Command::Check { kind: CheckKind::Value, text }) if text == "-12"
        );
        assert!(parse_args(&args(&["--check", "operator", "="])).is_err());
        assert!(parse_args(&args(&["--check", "field"])).is_err());
        assert!(CheckKind::Field.run("cf[10]"));
        assert!(!CheckKind::Function.run("cf[10]"));
    }

    #[test]
    fn test_parse_output_is_json() {
        let output = render_parse("project = FOO ORDER BY created").unwrap();
        assert!(output.ok);
        assert!(output.stderr.is_none());
        let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
        assert!(value["canonical"].as_str().unwrap().starts_with("project = FOO"));

        let output = render_parse("project = ").unwrap();
        assert!(!output.ok);
        let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
        assert_eq!(value["error"]["key"], "jql.parse.bad.operand.eof");
        assert!(output.stderr.is_some());
    }

    #[test]
    fn test_default_logging_keeps_stdout_clean() {
        let preferences = jql_parser::config::runtime::LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: false,
            min_log_level: jql_parser::config::runtime::LogLevel::Debug,
            include_context: true,
        };
        let service = logging::LoggingService::from_preferences(&preferences);
        assert!(!service.should_log(logging::LogLevel::Error));
    }

    #[test]
    fn test_file_options() {
        let command = parse_args(&args(&["--file", "q.jql", "--threads", "2", "--fail-fast"])).unwrap();
        match command {
            Command::File { path, config } => {
                assert_eq!(path, PathBuf::from("q.jql"));
                assert_eq!(config.worker_threads, 2);
                assert!(config.stop_on_first_error);
                assert!(config.skip_comment_lines);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_args(&args(&["--file", "q.jql", "--threads", "many"])).is_err());
        assert!(parse_args(&args(&["--file", "q.jql", "--recursive"])).is_err());
        assert!(parse_args(&args(&["--file"])).is_err());
    }
}
