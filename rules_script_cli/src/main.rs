//! rules-script CLI
//!
//! Tokenizes, highlights and checks Rules Script files using the
//! `rules_script` library. Library log events are forwarded to the `log`
//! facade and printed by `env_logger`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use rules_script::batch::{process_directory_with_config, BatchConfig};
use rules_script::config::RuntimeConfig;
use rules_script::file_processor::create_processor_from_preferences;
use rules_script::logging::{self, LogEvent, LogLevel, Logger, LoggingService};
use rules_script::mode::{modes, SAMPLE_SCRIPT};
use rules_script::{pipeline, render_html, TokenKind};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Rules Script lexer and highlighter
#[derive(Parser, Debug)]
#[command(name = "rules-script")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tokenize and highlight Rules Script files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Runtime preferences file (TOML)
    #[arg(short, long, global = true, env = "RULES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tokens of a file, one per line
    Tokens {
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Skip whitespace, comments and unclassified characters
        #[arg(long)]
        significant: bool,
    },

    /// Render a file as HTML with `cm-*` style classes
    Highlight { file: PathBuf },

    /// Tokenize a file, or every rules file under a directory, and report failures
    Check {
        path: PathBuf,

        /// Worker threads
        #[arg(short = 'j', long, default_value_t = num_cpus::get())]
        threads: usize,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Stop discovering after this many files
        #[arg(long)]
        max_files: Option<usize>,

        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the bundled sample script
    Sample,

    /// List registered language modes
    Modes,
}

/// Forwards library events to the `log` facade
struct LogFacadeLogger;

impl Logger for LogFacadeLogger {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: "rules_script", level, "{}", event.format());
    }
}

#[derive(Serialize)]
struct TokenRecord<'a> {
    line: u32,
    column: u32,
    kind: TokenKind,
    style: Option<&'static str>,
    text: &'a str,
}

fn verbosity_filter(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn library_level(verbose: u8, configured: LogLevel) -> LogLevel {
    let requested = match verbose {
        0 => LogLevel::Warning,
        1 => LogLevel::Info,
        _ => LogLevel::Debug,
    };
    requested.max(configured)
}

fn load_config(path: Option<&Path>) -> CliResult<RuntimeConfig> {
    match path {
        Some(path) => Ok(RuntimeConfig::from_toml_file(path)?),
        None => Ok(RuntimeConfig::default()),
    }
}

fn init_logging(verbose: u8, config: &RuntimeConfig) -> CliResult<()> {
    env_logger::Builder::new()
        .filter_level(verbosity_filter(verbose))
        .parse_default_env()
        .format_timestamp(None)
        .init();

    logging::config::init_runtime_preferences(config.logging.clone())?;

    let level = library_level(verbose, config.logging.min_log_level.to_events_log_level());
    let service = LoggingService::new(Arc::new(LogFacadeLogger), level);
    logging::init_global_logging_with_service(Arc::new(service))?;
    Ok(())
}

fn path_str(path: &Path) -> CliResult<&str> {
    path.to_str()
        .ok_or_else(|| format!("Path is not valid UTF-8: {}", path.display()).into())
}

fn run_tokens(config: &RuntimeConfig, file: &Path, json: bool, significant: bool) -> CliResult<()> {
    let result = pipeline::process_file_with_preferences(
        path_str(file)?,
        &config.file_processor,
        config.lexical.clone(),
    )?;

    let records: Vec<TokenRecord<'_>> = result
        .tokens
        .all_tokens()
        .iter()
        .filter(|token| !significant || token.value.kind.is_significant())
        .map(|token| TokenRecord {
            line: token.span.start().line,
            column: token.span.start().column,
            kind: token.value.kind,
            style: token.value.kind.style(),
            text: &token.value.text,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!(
                "{}:{}\t{}\t{:?}",
                record.line, record.column, record.kind, record.text
            );
        }
    }

    if result.ends_in_string() {
        log::warn!("{} ends inside an unterminated string", file.display());
    }
    Ok(())
}

fn run_highlight(config: &RuntimeConfig, file: &Path) -> CliResult<()> {
    let processor = create_processor_from_preferences(&config.file_processor);
    let file = processor.process_file(path_str(file)?)?;
    println!("{}", render_html(&file.source));
    Ok(())
}

fn run_check_file(config: &RuntimeConfig, file: &Path) -> CliResult<bool> {
    let outcome = pipeline::process_file_with_preferences(
        path_str(file)?,
        &config.file_processor,
        config.lexical.clone(),
    );

    let passed = match outcome {
        Ok(result) => {
            println!(
                "{}: {} tokens ({} significant) on {} lines",
                file.display(),
                result.token_count(),
                result.significant_token_count(),
                result.file_metadata.line_count
            );
            true
        }
        Err(error) => {
            eprintln!("error[{}]: {}: {}", error.error_code(), file.display(), error);
            false
        }
    };

    logging::print_cargo_style_summary();
    Ok(passed)
}

fn run_check(config: &RuntimeConfig, path: &Path, batch: BatchConfig) -> CliResult<bool> {
    if path.is_file() {
        return run_check_file(config, path);
    }

    let batch = BatchConfig {
        file_preferences: config.file_processor.clone(),
        lexical_preferences: config.lexical.clone(),
        ..batch
    };

    let results = process_directory_with_config(path, &batch)?;
    println!("{}", results.summary());

    for (file, error) in &results.failed_files {
        eprintln!("error[{}]: {}: {}", error.error_code(), file.display(), error);
    }
    for (file, reason) in &results.skipped_files {
        eprintln!("skipped: {}: {}", file.display(), reason);
    }

    logging::print_cargo_style_summary();

    Ok(results.failure_count() == 0)
}

fn run(cli: Cli) -> CliResult<bool> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &config)?;

    match cli.command {
        Commands::Tokens {
            file,
            json,
            significant,
        } => run_tokens(&config, &file, json, significant).map(|_| true),
        Commands::Highlight { file } => run_highlight(&config, &file).map(|_| true),
        Commands::Check {
            path,
            threads,
            no_recursive,
            max_files,
            fail_fast,
        } => {
            let batch = BatchConfig {
                max_threads: threads,
                recursive: !no_recursive,
                max_files,
                fail_fast,
                ..BatchConfig::default()
            };
            run_check(&config, &path, batch)
        }
        Commands::Sample => {
            println!("{SAMPLE_SCRIPT}");
            Ok(true)
        }
        Commands::Modes => {
            for mode in modes() {
                println!(
                    "{}\t{}\t{}\t{}",
                    mode.name,
                    mode.mime,
                    mode.display_name,
                    mode.extensions.join(",")
                );
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
