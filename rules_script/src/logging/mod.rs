//! Process-wide logging for the Rules Script toolchain
//!
//! Events flow through a global [`LoggingService`]. When a file context is
//! active on the current thread, errors and warnings are also recorded in the
//! global [`ErrorCollector`] for the cargo-style summary.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

/// File currently being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the configured global logger and error collector
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(LoggingService::with_config());
    init_global_logging_with_service(service.clone())?;

    service.log_success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    );
    Ok(())
}

/// Install a caller-built service (CLI bridges, tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    // A collector left over from an earlier partial init is kept
    let _ = GLOBAL_ERROR_COLLECTOR.set(Arc::new(ErrorCollector::new()));
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(Arc::as_ref)
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get().map(Arc::as_ref)
}

/// Whether a debug event would reach the global logger
pub fn debug_enabled() -> bool {
    match try_get_global_logger() {
        Some(logger) => logger.should_log(LogLevel::Debug),
        None => config::get_min_log_level() >= LogLevel::Debug,
    }
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    if let Some(collector) = try_get_global_error_collector() {
        collector.record_clean_file(&file_path);
    }
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileContext { file_path, file_id });
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the thread's file context set, restoring the previous one after
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_file_context();
    set_file_context(file_path, file_id);
    let result = f();
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// EVENT DISPATCH
// ============================================================================

/// Attach file context, forward to the global logger and record errors and
/// warnings in the collector. Used by the logging macros.
pub fn dispatch(mut event: LogEvent) {
    let file_ctx = get_current_file_context();

    if let Some(ctx) = &file_ctx {
        event = event
            .with_file_path(&ctx.file_path.display().to_string())
            .with_context("file_id", &ctx.file_id.to_string());
    }

    let message = config::truncate_message(&event.message);
    if message.len() < event.message.len() {
        event.message = message.to_string();
    }

    let collect = event.is_error() || event.is_warning();

    match (file_ctx, collect) {
        (Some(ctx), true) => {
            if let Some(logger) = try_get_global_logger() {
                logger.log_event(event.clone());
            }
            if let Some(collector) = try_get_global_error_collector() {
                collector.record_event(&ctx.file_path, event);
            }
        }
        _ => {
            if let Some(logger) = try_get_global_logger() {
                logger.log_event(event);
            }
        }
    }
}

// ============================================================================
// SUMMARY HELPERS
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::get_summary)
        .unwrap_or_default()
}

/// Cargo-style listing of everything collected so far
pub fn cargo_style_summary() -> String {
    try_get_global_error_collector()
        .map(collector::format_cargo_style_errors)
        .unwrap_or_default()
}

/// Print the cargo-style listing to stderr unless disabled in preferences
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    let summary = cargo_style_summary();
    if !summary.is_empty() {
        eprint!("{}", summary);
    }
}

pub fn clear_error_collection() {
    if let Some(collector) = try_get_global_error_collector() {
        collector.clear();
    }
}

/// Log an error even when global logging was never initialized
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_error(code, message),
        None => eprintln!("[ERROR] {} - {}", code, message),
    }
}
