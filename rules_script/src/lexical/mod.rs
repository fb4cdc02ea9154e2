//! Lexical analysis for Rules Script
//!
//! - [`scanner`]: the per-line tokenizer, one classification per call
//! - [`stream`]: the character cursor the tokenizer reads from
//! - [`state`]: the state carried between lines of one document
//! - [`analyzer`]: whole-document driver with limits, spans and logging

pub mod analyzer;
pub mod scanner;
pub mod state;
pub mod stream;

use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalLimits, LexicalMetrics};
pub use scanner::{scan, scan_line, LineToken};
pub use state::ScanState;
pub use stream::{is_space, LineStream};

/// Tokenize a document with default preferences
pub fn tokenize_document(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_document(source)
}

/// Tokenize a processed file with default preferences
pub fn tokenize_file_result(file_result: &FileProcessingResult) -> Result<TokenStream, LexerError> {
    let mut analyzer = LexicalAnalyzer::new();
    analyzer.tokenize_file_result(file_result)
}

pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
    analyzer.tokenize_file_result(file_result)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

/// Check that every lexical code is registered and the compile-time limits
/// are usable
pub fn validate_lexical_configuration() -> Result<(), String> {
    use crate::config::compile_time::lexical::*;
    use crate::logging::codes;

    let lexical_codes = [
        codes::lexical::DOCUMENT_TOO_LARGE,
        codes::lexical::LINE_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
        codes::lexical::UNTERMINATED_STRING,
    ];
    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_LINE_LENGTH == 0 || MAX_TOKEN_COUNT == 0 {
        return Err("Lexical limits cannot be zero".to_string());
    }
    if MAX_LINE_LENGTH > MAX_DOCUMENT_SIZE {
        return Err("MAX_LINE_LENGTH exceeds MAX_DOCUMENT_SIZE".to_string());
    }

    Ok(())
}
