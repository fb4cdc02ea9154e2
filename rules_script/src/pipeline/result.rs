use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::tokens::TokenStream;
use std::time::Duration;

/// A rules file after loading and tokenization
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub file_metadata: FileMetadata,
    pub tokens: TokenStream,
    pub lexical_metrics: LexicalMetrics,
    pub processing_duration: Duration,
}

impl DocumentResult {
    pub fn new(
        file_metadata: FileMetadata,
        tokens: TokenStream,
        lexical_metrics: LexicalMetrics,
        processing_duration: Duration,
    ) -> Self {
        Self {
            file_metadata,
            tokens,
            lexical_metrics,
            processing_duration,
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn significant_token_count(&self) -> usize {
        self.tokens.significant_len()
    }

    /// Whether the last line of the file leaves a string open
    pub fn ends_in_string(&self) -> bool {
        self.tokens.ends_in_string()
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64().max(f64::EPSILON);
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "Rules file processed",
            "file" => file_path,
            "tokens" => self.token_count(),
            "significant_tokens" => self.significant_token_count(),
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "processing_rate_bytes_per_sec" => format!("{:.0}",
                self.file_metadata.size as f64 / seconds)
        );
    }
}
