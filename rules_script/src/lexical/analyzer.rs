//! Document analyzer: drives the line scanner over a whole document
//!
//! The scanner itself never fails and never logs. Resource limits, spans,
//! metrics and logging all live here.

use super::scanner::scan_line;
use super::state::ScanState;
use crate::config::compile_time::lexical::{MAX_DOCUMENT_SIZE, MAX_LINE_LENGTH, MAX_TOKEN_COUNT};
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token, TokenCounts, TokenKind, TokenStream};
use crate::utils::{split_lines, Position, SourceMap, Span, Spanned};
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Document too large: {size} bytes (max {max})")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("Line {line} too long: {length} bytes (max {max})")]
    LineTooLong {
        line: usize,
        length: usize,
        max: usize,
    },

    #[error("Too many tokens: {count} (max {max})")]
    TooManyTokens { count: usize, max: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::DocumentTooLarge { .. } => codes::lexical::DOCUMENT_TOO_LARGE,
            LexerError::LineTooLong { .. } => codes::lexical::LINE_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Size limits enforced while tokenizing. Defaults are the compile-time
/// values for the active build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalLimits {
    pub max_document_size: usize,
    pub max_line_length: usize,
    pub max_token_count: usize,
}

impl Default for LexicalLimits {
    fn default() -> Self {
        Self {
            max_document_size: MAX_DOCUMENT_SIZE,
            max_line_length: MAX_LINE_LENGTH,
            max_token_count: MAX_TOKEN_COUNT,
        }
    }
}

/// Statistics gathered during the last tokenization
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub counts: TokenCounts,
    pub lines_scanned: usize,
    /// Lines that began inside a string opened on an earlier line
    pub string_continuation_lines: usize,
    pub max_line_length: usize,
    pub ends_in_string: bool,
    /// Operator text to occurrence count, filled when operator tracking is on
    pub operator_usage: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(
        &mut self,
        kind: TokenKind,
        text: &str,
        preferences: &LexicalPreferences,
    ) {
        if preferences.collect_detailed_metrics {
            self.counts.record(kind);
        }

        if kind == TokenKind::Operator && preferences.track_operator_patterns {
            *self.operator_usage.entry(text.to_string()).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_line(&mut self, length: usize, continued_string: bool) {
        self.lines_scanned += 1;
        self.max_line_length = self.max_line_length.max(length);
        if continued_string {
            self.string_continuation_lines += 1;
        }
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
    limits: LexicalLimits,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
            limits: LexicalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: LexicalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn limits(&self) -> &LexicalLimits {
        &self.limits
    }

    /// Tokenize a file loaded by the file processor
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let file_path = file_result.metadata.path.display().to_string();
        log_debug!("Tokenizing file",
            "file" => file_path,
            "size_bytes" => file_result.metadata.size,
            "lines" => file_result.metadata.line_count
        );
        self.tokenize_document(&file_result.source)
    }

    /// Tokenize a whole document from the start state
    pub fn tokenize_document(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        let mut state = ScanState::new();
        self.tokenize_document_with_state(source, &mut state)
    }

    /// Tokenize a document continuing from `state`, which holds the state
    /// after the last line on return
    pub fn tokenize_document_with_state(
        &mut self,
        source: &str,
        state: &mut ScanState,
    ) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        if source.len() > self.limits.max_document_size {
            let error = LexerError::DocumentTooLarge {
                size: source.len(),
                max: self.limits.max_document_size,
            };
            log_error!(error.error_code(), "Document exceeds maximum size",
                "size_bytes" => source.len(),
                "limit" => self.limits.max_document_size
            );
            return Err(error);
        }

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "start_in_string" => state.in_string(),
            "max_tokens_allowed" => self.limits.max_token_count
        );

        let mut tokens: Vec<SpannedToken> = Vec::new();
        let mut end = Position::start();
        let mut string_start_line = 1usize;

        for line in split_lines(source) {
            let line_number = line.index + 1;
            let line_start = Position::new(line.offset, line_number as u32, 1);

            if line.text.len() > self.limits.max_line_length {
                let error = LexerError::LineTooLong {
                    line: line_number,
                    length: line.text.len(),
                    max: self.limits.max_line_length,
                };
                log_error!(error.error_code(), "Line exceeds maximum length",
                    span = Span::new(line_start, line_start),
                    "length" => line.text.len(),
                    "limit" => self.limits.max_line_length
                );
                return Err(error);
            }

            // An open string only colors what follows; it never fails the document
            let continued_string = state.in_string();
            self.metrics.record_line(line.text.len(), continued_string);

            let mut pos = line_start;
            for line_token in scan_line(line.text, state) {
                if tokens.len() >= self.limits.max_token_count {
                    let error = LexerError::TooManyTokens {
                        count: tokens.len() + 1,
                        max: self.limits.max_token_count,
                    };
                    log_error!(error.error_code(), "Token limit exceeded",
                        span = Span::new(pos, pos),
                        "limit" => self.limits.max_token_count
                    );
                    return Err(error);
                }

                let text = line_token.text(line.text);
                let next = pos.advance_str(text);
                self.metrics
                    .record_token(line_token.kind, text, &self.preferences);
                tokens.push(Spanned::new(
                    Token::new(line_token.kind, text),
                    Span::new(pos, next),
                ));
                pos = next;
            }

            if !continued_string && state.in_string() {
                string_start_line = line_number;
            }
            end = pos;
        }

        self.metrics.ends_in_string = state.in_string();

        if let Some(quote) = state.string_char() {
            if self.preferences.warn_unterminated_strings {
                log_warning!(code = codes::lexical::UNTERMINATED_STRING,
                    "String literal is not terminated at end of document",
                    span = Span::new(end, end),
                    "quote" => quote,
                    "opened_on_line" => string_start_line
                );
            }
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis completed",
            "tokens" => tokens.len(),
            "lines" => self.metrics.lines_scanned,
            "ends_in_string" => self.metrics.ends_in_string
        );

        let mut stream = TokenStream::with_source_map(tokens, SourceMap::new(source.to_string()));
        stream.set_ends_in_string(state.in_string());
        Ok(stream)
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::SAMPLE_SCRIPT;
    use assert_matches::assert_matches;

    fn preferences() -> LexicalPreferences {
        LexicalPreferences {
            collect_detailed_metrics: true,
            track_operator_patterns: true,
            warn_unterminated_strings: true,
        }
    }

    fn small_limits() -> LexicalLimits {
        LexicalLimits {
            max_document_size: 64,
            max_line_length: 16,
            max_token_count: 8,
        }
    }

    #[test]
    fn test_sample_script_tokenizes() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        let stream = analyzer.tokenize_document(SAMPLE_SCRIPT).unwrap();

        assert!(!stream.ends_in_string());
        let keywords: Vec<&str> = stream
            .iter_significant()
            .filter(|t| t.value.kind == TokenKind::Keyword)
            .map(|t| t.value.text.as_str())
            .collect();
        assert_eq!(keywords.iter().filter(|k| **k == "RULE").count(), 3);
        assert!(keywords.contains(&"OR"));

        let metrics = analyzer.metrics();
        assert_eq!(metrics.lines_scanned, SAMPLE_SCRIPT.lines().count());
        assert_eq!(metrics.counts.get(TokenKind::Comment), 1);
        assert_eq!(metrics.counts.get(TokenKind::Type), 3);
        assert_eq!(metrics.operator_usage.get(">="), Some(&1));
        assert_eq!(metrics.operator_usage.get("="), Some(&3));
        assert_eq!(metrics.counts, stream.counts());
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let source = "RULE \"a\"\r\n  WHEN é = 1\rSCORE: 5";
        let stream = LexicalAnalyzer::new().tokenize_document(source).unwrap();

        let when = stream
            .iter_significant()
            .find(|t| t.value.text == "WHEN")
            .unwrap();
        assert_eq!(when.span.start, Position::new(12, 2, 3));
        assert_eq!(when.span.end, Position::new(16, 2, 7));

        // é is two bytes but one column
        let eq = stream
            .tokens_on_line(2)
            .find(|t| t.value.kind == TokenKind::Operator)
            .unwrap();
        assert_eq!(eq.span.start.column, 10);
        assert_eq!(eq.span.start.offset, 20);

        let score = stream.tokens_on_line(3).next().unwrap();
        assert_eq!(score.value, Token::new(TokenKind::Clause, "SCORE"));
        assert_eq!(score.span.start, Position::new(24, 3, 1));

        for token in stream.all_tokens() {
            assert_eq!(stream.source_text(&token.span), Some(token.value.text.as_str()));
        }
    }

    #[test]
    fn test_state_threads_across_lines() {
        let source = "MESSAGE: \"first\n\nsecond\" AND x";
        let mut analyzer = LexicalAnalyzer::new();
        let stream = analyzer.tokenize_document(source).unwrap();

        let line3: Vec<_> = stream.tokens_on_line(3).map(|t| t.value.clone()).collect();
        assert_eq!(line3[0], Token::new(TokenKind::String, "second\""));
        assert_eq!(line3[2], Token::new(TokenKind::Keyword, "AND"));
        assert_eq!(analyzer.metrics().string_continuation_lines, 2);
        assert!(!stream.ends_in_string());
    }

    #[test]
    fn test_document_ending_in_string() {
        let mut state = ScanState::new();
        let mut analyzer = LexicalAnalyzer::new();
        let stream = analyzer
            .tokenize_document_with_state("FAIL MESSAGE: 'open", &mut state)
            .unwrap();

        assert!(stream.ends_in_string());
        assert!(analyzer.metrics().ends_in_string);
        assert_eq!(state.string_char(), Some('\''));

        // Continuing with the returned state closes the string
        let rest = analyzer
            .tokenize_document_with_state("end'", &mut state)
            .unwrap();
        assert_eq!(rest.all_tokens()[0].value.kind, TokenKind::String);
        assert!(!state.in_string());
    }

    #[test]
    fn test_empty_document() {
        let stream = LexicalAnalyzer::new().tokenize_document("").unwrap();
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_limits_reject_oversized_input() {
        let mut analyzer = LexicalAnalyzer::new().with_limits(small_limits());

        assert_matches!(
            analyzer.tokenize_document(&"x".repeat(65)),
            Err(LexerError::DocumentTooLarge { size: 65, max: 64 })
        );
        assert_matches!(
            analyzer.tokenize_document("ok\nthis line is too long"),
            Err(LexerError::LineTooLong { line: 2, length: 21, .. })
        );
        assert_matches!(
            analyzer.tokenize_document("a b c d e"),
            Err(LexerError::TooManyTokens { count: 9, max: 8 })
        );
    }

    #[test]
    fn test_long_open_string_is_not_an_error() {
        let mut source = String::from("RULE \"oops\nWHEN a = 1");
        source.push_str(&"\nx".repeat(500));

        let mut analyzer = LexicalAnalyzer::new();
        let stream = analyzer.tokenize_document(&source).unwrap();

        assert!(stream.ends_in_string());
        assert!(analyzer.metrics().ends_in_string);
        assert_eq!(analyzer.metrics().string_continuation_lines, 501);
        assert!(stream
            .tokens_on_line(502)
            .all(|t| t.value.kind == TokenKind::String));
    }

    #[test]
    fn test_metrics_reset_between_documents() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        analyzer.tokenize_document("a >= 1\nb >= 2").unwrap();
        assert_eq!(analyzer.metrics().operator_usage.get(">="), Some(&2));

        analyzer.tokenize_document("c").unwrap();
        assert!(analyzer.metrics().operator_usage.is_empty());
        assert_eq!(analyzer.metrics().lines_scanned, 1);
    }

    #[test]
    fn test_metrics_respect_preferences() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            collect_detailed_metrics: false,
            track_operator_patterns: false,
            warn_unterminated_strings: false,
        });
        let stream = analyzer.tokenize_document("a = 1").unwrap();
        assert_eq!(analyzer.metrics().counts.total(), 0);
        assert!(analyzer.metrics().operator_usage.is_empty());
        assert_eq!(stream.counts().get(TokenKind::Operator), 1);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LexerError::LineTooLong {
                line: 1,
                length: 2,
                max: 1
            }
            .error_code()
            .as_str(),
            "E021"
        );
        assert_eq!(
            LexerError::TooManyTokens { count: 2, max: 1 }
                .error_code()
                .as_str(),
            "E022"
        );
    }
}
