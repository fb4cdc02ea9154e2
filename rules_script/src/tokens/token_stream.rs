//! Scanned documents as navigable token streams

use super::kind::TokenKind;
use crate::utils::{SourceMap, Span, Spanned};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A classified span of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}

pub type SpannedToken = Spanned<Token>;

/// Number of tokens per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    counts: BTreeMap<TokenKind, usize>,
}

impl TokenCounts {
    pub fn record(&mut self, kind: TokenKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    pub fn get(&self, kind: TokenKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn significant(&self) -> usize {
        self.counts
            .iter()
            .filter(|(kind, _)| kind.is_significant())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }

    pub fn merge(&mut self, other: &TokenCounts) {
        for (kind, count) in other.iter() {
            *self.counts.entry(kind).or_insert(0) += count;
        }
    }
}

/// Every token of a document in source order, plus a cursor over the
/// significant ones
#[derive(Debug, Clone)]
pub struct TokenStream {
    all_tokens: Vec<SpannedToken>,
    /// Indices into `all_tokens` of tokens a parser consumes
    significant_indices: Vec<usize>,
    /// Cursor into `significant_indices`
    position: usize,
    source_map: Option<SourceMap>,
    ends_in_string: bool,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.value.kind.is_significant())
            .map(|(i, _)| i)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
            ends_in_string: false,
        }
    }

    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        Self {
            source_map: Some(source_map),
            ..Self::new(tokens)
        }
    }

    pub(crate) fn set_ends_in_string(&mut self, ends_in_string: bool) {
        self.ends_in_string = ends_in_string;
    }

    /// Whether the document's last line left a string open
    pub fn ends_in_string(&self) -> bool {
        self.ends_in_string
    }

    // --- navigation over significant tokens ---

    pub fn current(&self) -> Option<&SpannedToken> {
        self.peek_ahead(0)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.value.kind)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + n)
            .map(|&i| &self.all_tokens[i])
    }

    /// Return the current token and move past it
    pub fn advance(&mut self) -> Option<&SpannedToken> {
        let index = *self.significant_indices.get(self.position)?;
        self.position += 1;
        Some(&self.all_tokens[index])
    }

    /// Advance when the current token has `kind` and, if given, matching
    /// text (case-insensitive)
    pub fn advance_if(&mut self, kind: TokenKind, text: Option<&str>) -> bool {
        let matches = self.current().is_some_and(|t| {
            t.value.kind == kind && text.map_or(true, |s| t.value.text.eq_ignore_ascii_case(s))
        });
        if matches {
            self.position += 1;
        }
        matches
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.significant_indices.len()
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    // --- whole-document queries ---

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices.iter().map(|&i| &self.all_tokens[i])
    }

    /// Tokens on a 1-based line
    pub fn tokens_on_line(&self, line: u32) -> impl Iterator<Item = &SpannedToken> {
        let start = self
            .all_tokens
            .partition_point(|t| t.span.start.line < line);
        self.all_tokens[start..]
            .iter()
            .take_while(move |t| t.span.start.line == line)
    }

    pub fn len(&self) -> usize {
        self.all_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_tokens.is_empty()
    }

    pub fn significant_len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn counts(&self) -> TokenCounts {
        let mut counts = TokenCounts::default();
        for token in &self.all_tokens {
            counts.record(token.value.kind);
        }
        counts
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    pub fn source_text(&self, span: &Span) -> Option<&str> {
        self.source_map.as_ref()?.span_text(span)
    }

    /// Error excerpt for `span`, or just the message with a location when no
    /// source map is attached
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        match &self.source_map {
            Some(map) => map.format_error(span, message),
            None => format!("error: {} at {}", message, span.start),
        }
    }
}
