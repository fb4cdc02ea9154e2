//! File to token stream pipeline
//!
//! Runs the file processor and the lexical analyzer inside a logging file
//! context, so every event they emit is attributed to the file.

mod error;
mod result;

pub use error::PipelineError;
pub use result::DocumentResult;

use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences};
use crate::file_processor::FileProcessor;
use crate::lexical::LexicalAnalyzer;
use crate::logging;
use std::path::PathBuf;
use std::time::Instant;

/// Process a single file with default preferences
pub fn process_file(file_path: &str) -> Result<DocumentResult, PipelineError> {
    process_file_with_preferences(
        file_path,
        &FileProcessorPreferences::default(),
        LexicalPreferences::default(),
    )
}

pub fn process_file_with_preferences(
    file_path: &str,
    file_preferences: &FileProcessorPreferences,
    lexical_preferences: LexicalPreferences,
) -> Result<DocumentResult, PipelineError> {
    process_file_with_id(file_path, 0, file_preferences, lexical_preferences)
}

/// Pipeline body shared with batch processing, which numbers its files
pub(crate) fn process_file_with_id(
    file_path: &str,
    file_id: usize,
    file_preferences: &FileProcessorPreferences,
    lexical_preferences: LexicalPreferences,
) -> Result<DocumentResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), file_id, || {
        crate::log_info!("Starting rules file pipeline", "file" => file_path);

        let file_result = FileProcessor::from_preferences(file_preferences).process_file(file_path)?;

        let mut analyzer = LexicalAnalyzer::with_preferences(lexical_preferences);
        let tokens = analyzer.tokenize_file_result(&file_result)?;

        let result = DocumentResult::new(
            file_result.metadata,
            tokens,
            analyzer.metrics().clone(),
            start_time.elapsed(),
        );
        result.log_success(file_path);

        Ok(result)
    })
}
