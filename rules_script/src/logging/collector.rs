//! Per-file event collection with cargo-style reporting

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_ERROR_COLLECTION;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe store of events keyed by file path
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for `file_path`. Past the per-file limit a single
    /// overflow warning is stored and further events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.lock();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_ERROR_COLLECTION {
            file_events.push(event);
        } else if file_events.len() == MAX_ERROR_COLLECTION {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_ERROR_COLLECTION
            )));
        }
    }

    /// Register a file that finished without events so it counts as successful
    pub fn record_clean_file(&self, file_path: &Path) {
        self.lock().entry(file_path.to_path_buf()).or_default();
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.lock().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.lock().clone()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.lock()
            .get(file_path)
            .is_some_and(|events| events.iter().any(LogEvent::is_error))
    }

    pub fn get_files_with_errors(&self) -> Vec<PathBuf> {
        self.lock()
            .iter()
            .filter(|(_, events)| events.iter().any(LogEvent::is_error))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn get_critical_errors(&self) -> Vec<(PathBuf, LogEvent)> {
        self.lock()
            .iter()
            .flat_map(|(path, events)| {
                events
                    .iter()
                    .filter(|e| e.is_error() && e.requires_halt())
                    .map(move |e| (path.clone(), e.clone()))
            })
            .collect()
    }

    pub fn total_event_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.lock();
        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
                summary.successful_files += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_event(output: &mut String, label: &str, file_path: &Path, event: &LogEvent) {
    let location = event
        .span
        .as_ref()
        .map(|s| {
            format!(
                "\n  --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default();

    output.push_str(&format!(
        "{}[{}]: {}{}\n",
        label, event.code, event.message, location
    ));

    let mut keys: Vec<_> = event
        .context
        .keys()
        .filter(|k| k.as_str() != "file_path")
        .collect();
    keys.sort();
    for key in keys {
        output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
    }

    if let Some(metadata) = super::codes::get_error_metadata(event.code.as_str()) {
        output.push_str(&format!("  = help: {}\n", metadata.recommended_action));
    }
}

/// Render collected errors and warnings grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in errors {
            push_event(&mut output, "error", file_path, event);
        }
        for event in warnings {
            push_event(&mut output, "warning", file_path, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.has_errors() {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.has_warnings() {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_summary_counts() {
        let collector = ErrorCollector::new();
        let broken = PathBuf::from("broken.rules");
        let open = PathBuf::from("open_string.rules");
        let clean = PathBuf::from("clean.rules");

        collector.record_event(
            &broken,
            LogEvent::error(codes::lexical::LINE_TOO_LONG, "Line 3 too long"),
        );
        collector.record_event(
            &open,
            LogEvent::warning_with_code(codes::lexical::UNTERMINATED_STRING, "Open string"),
        );
        collector.record_clean_file(&clean);

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.successful_files, 2);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(collector.get_files_with_errors(), vec![broken.clone()]);
        assert!(collector.file_has_errors(&broken));
        assert!(!collector.file_has_errors(&clean));
    }

    #[test]
    fn test_per_file_limit() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("noisy.rules");
        for _ in 0..MAX_ERROR_COLLECTION + 5 {
            collector.record_event(&path, LogEvent::warning("noise"));
        }
        assert_eq!(collector.get_file_events(&path).len(), MAX_ERROR_COLLECTION + 1);
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("eligibility.rules");
        let span = Span::new(Position::new(120, 7, 20), Position::new(140, 7, 40));

        collector.record_event(
            &path,
            LogEvent::warning_with_code(codes::lexical::UNTERMINATED_STRING, "Open string")
                .with_span(span)
                .with_context("quote", "'"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking eligibility.rules..."));
        assert!(output.contains("warning[W020]: Open string"));
        assert!(output.contains("--> eligibility.rules:7:20"));
        assert!(output.contains("= quote: '"));
        assert!(output.contains("Total warnings: 1"));
    }

    #[test]
    fn test_critical_errors() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("a.rules");
        collector.record_event(&path, LogEvent::error(codes::system::INTERNAL_ERROR, "boom"));
        collector.record_event(&path, LogEvent::error(codes::file_processing::EMPTY_FILE, "empty"));

        let critical = collector.get_critical_errors();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].1.code, codes::system::INTERNAL_ERROR);
        assert_eq!(collector.total_event_count(), 2);
    }
}
