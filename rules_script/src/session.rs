//! Incremental highlighting of an editable document
//!
//! A session caches, for every line, the scan state the line starts in and
//! the tokens it produced. An edit rescans from the edited line and stops at
//! the first later line whose start state is unchanged, since every line
//! from there on would produce the same tokens as before.

use crate::lexical::{scan_line, LineToken, ScanState};
use crate::utils::split_lines;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Line {index} out of range (document has {line_count} lines)")]
    LineOutOfRange { index: usize, line_count: usize },

    #[error("Line text must not contain a line break")]
    MultiLineText,
}

#[derive(Debug, Clone)]
struct LineEntry {
    text: String,
    start_state: ScanState,
    end_state: ScanState,
    tokens: Vec<LineToken>,
}

impl LineEntry {
    fn new(text: String) -> Self {
        Self {
            text,
            start_state: ScanState::new(),
            end_state: ScanState::new(),
            tokens: Vec::new(),
        }
    }

    fn scan(&mut self, start_state: ScanState) {
        let mut state = start_state;
        self.tokens = scan_line(&self.text, &mut state);
        self.start_state = start_state;
        self.end_state = state;
    }
}

/// One document's lines with their cached scan results. Sessions never share
/// state with each other.
#[derive(Debug, Clone)]
pub struct HighlightSession {
    lines: Vec<LineEntry>,
}

impl HighlightSession {
    pub fn new(text: &str) -> Self {
        let mut session = Self { lines: Vec::new() };
        session.replace_text(text);
        session
    }

    /// Replace the whole document. Scanning restarts from the start state.
    /// Returns the number of lines scanned.
    pub fn replace_text(&mut self, text: &str) -> usize {
        self.lines = split_lines(text)
            .map(|line| LineEntry::new(line.text.to_string()))
            .collect();
        self.rescan_from(0, true)
    }

    /// Replace the text of line `index`. Returns the number of lines rescanned.
    pub fn edit_line(&mut self, index: usize, text: &str) -> Result<usize, SessionError> {
        Self::check_single_line(text)?;
        self.check_index(index)?;
        self.lines[index].text = text.to_string();
        Ok(self.rescan_from(index, true))
    }

    /// Insert a line before `index`; `index == line_count()` appends
    pub fn insert_line(&mut self, index: usize, text: &str) -> Result<usize, SessionError> {
        Self::check_single_line(text)?;
        if index > self.lines.len() {
            return Err(SessionError::LineOutOfRange {
                index,
                line_count: self.lines.len(),
            });
        }
        self.lines.insert(index, LineEntry::new(text.to_string()));
        Ok(self.rescan_from(index, true))
    }

    /// Remove line `index`. Removing the only line leaves one empty line.
    pub fn remove_line(&mut self, index: usize) -> Result<usize, SessionError> {
        self.check_index(index)?;
        if self.lines.len() == 1 {
            self.lines[0] = LineEntry::new(String::new());
            return Ok(self.rescan_from(0, true));
        }
        self.lines.remove(index);
        if index == self.lines.len() {
            return Ok(0);
        }
        Ok(self.rescan_from(index, false))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|line| line.text.as_str())
    }

    pub fn line_tokens(&self, index: usize) -> Option<&[LineToken]> {
        self.lines.get(index).map(|line| line.tokens.as_slice())
    }

    /// State line `index` starts in
    pub fn state_before(&self, index: usize) -> Option<ScanState> {
        self.lines.get(index).map(|line| line.start_state)
    }

    /// State line `index` leaves for the next line
    pub fn state_after(&self, index: usize) -> Option<ScanState> {
        self.lines.get(index).map(|line| line.end_state)
    }

    /// Whether the last line leaves a string open
    pub fn ends_in_string(&self) -> bool {
        self.lines
            .last()
            .is_some_and(|line| line.end_state.in_string())
    }

    /// Document text with lines joined by `\n`
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lines paired with their cached tokens
    pub fn iter_lines(&self) -> impl Iterator<Item = (&str, &[LineToken])> {
        self.lines
            .iter()
            .map(|line| (line.text.as_str(), line.tokens.as_slice()))
    }

    fn rescan_from(&mut self, index: usize, force_first: bool) -> usize {
        let mut state = match index {
            0 => ScanState::new(),
            _ => self.lines[index - 1].end_state,
        };
        let mut rescanned = 0;

        for (offset, line) in self.lines[index..].iter_mut().enumerate() {
            let forced = force_first && offset == 0;
            if !forced && line.start_state == state {
                break;
            }
            line.scan(state);
            state = line.end_state;
            rescanned += 1;
        }

        rescanned
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(SessionError::LineOutOfRange {
                index,
                line_count: self.lines.len(),
            })
        }
    }

    fn check_single_line(text: &str) -> Result<(), SessionError> {
        if text.contains('\n') || text.trim_end_matches('\r').contains('\r') {
            Err(SessionError::MultiLineText)
        } else {
            Ok(())
        }
    }
}

impl Default for HighlightSession {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalAnalyzer;
    use crate::mode::SAMPLE_SCRIPT;
    use crate::tokens::TokenKind;

    fn kinds(session: &HighlightSession, index: usize) -> Vec<TokenKind> {
        session
            .line_tokens(index)
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    /// Tokens a fresh scan of the session's text would produce
    fn assert_matches_fresh_scan(session: &HighlightSession) {
        let fresh = HighlightSession::new(&session.text());
        for index in 0..session.line_count() {
            assert_eq!(session.line_tokens(index), fresh.line_tokens(index));
            assert_eq!(session.state_before(index), fresh.state_before(index));
        }
    }

    #[test]
    fn test_new_scans_every_line() {
        let session = HighlightSession::new(SAMPLE_SCRIPT);
        assert_eq!(session.line_count(), 21);
        assert_eq!(kinds(&session, 0), vec![TokenKind::Comment]);
        assert!(session.line_tokens(1).unwrap().is_empty());
        assert!(!session.ends_in_string());
        assert_eq!(session.text(), SAMPLE_SCRIPT);
    }

    #[test]
    fn test_agrees_with_document_analyzer() {
        let session = HighlightSession::new(SAMPLE_SCRIPT);
        let stream = LexicalAnalyzer::new()
            .tokenize_document(SAMPLE_SCRIPT)
            .unwrap();

        for (index, (line, tokens)) in session.iter_lines().enumerate() {
            let expected: Vec<(TokenKind, &str)> = stream
                .tokens_on_line(index as u32 + 1)
                .map(|t| (t.value.kind, t.value.text.as_str()))
                .collect();
            let actual: Vec<(TokenKind, &str)> =
                tokens.iter().map(|t| (t.kind, t.text(line))).collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_local_edit_rescans_one_line() {
        let mut session = HighlightSession::new(SAMPLE_SCRIPT);
        let rescanned = session.edit_line(6, "  WHEN age >= 21").unwrap();
        assert_eq!(rescanned, 1);
        assert_matches_fresh_scan(&session);
    }

    #[test]
    fn test_opening_string_rescans_until_closed() {
        let mut session = HighlightSession::new("a\nb\nc\nd");

        assert_eq!(session.edit_line(0, "'x").unwrap(), 4);
        assert!(session.state_before(3).unwrap().in_string());
        assert!(session.ends_in_string());
        assert_eq!(kinds(&session, 2), vec![TokenKind::String]);

        // Closing on line 2 rescans line 2 and the one line after it
        assert_eq!(session.edit_line(2, "c'").unwrap(), 2);
        assert!(!session.state_before(3).unwrap().in_string());
        assert!(!session.ends_in_string());
        assert_eq!(kinds(&session, 3), vec![TokenKind::Identifier]);
        assert_matches_fresh_scan(&session);
    }

    #[test]
    fn test_insert_and_remove_lines() {
        let mut session = HighlightSession::new("RULE \"x\"\nSCORE: 1");

        assert_eq!(session.insert_line(1, "  # note").unwrap(), 1);
        assert_eq!(session.line_count(), 3);
        assert_eq!(kinds(&session, 1), vec![TokenKind::None, TokenKind::Comment]);

        // Inserting an unterminated string changes every later line
        assert_eq!(session.insert_line(1, "\"open").unwrap(), 3);
        assert!(session.ends_in_string());

        // Removing it again restores the old states from line 1 onward
        assert_eq!(session.remove_line(1).unwrap(), 2);
        assert!(!session.ends_in_string());
        assert_matches_fresh_scan(&session);

        // Appending at the end
        assert_eq!(session.insert_line(3, "ORDER: 3").unwrap(), 1);
        assert_eq!(session.remove_line(3).unwrap(), 0);
        assert_eq!(session.line_count(), 3);
    }

    #[test]
    fn test_removing_last_line_leaves_empty_document() {
        let mut session = HighlightSession::new("'open");
        assert!(session.ends_in_string());
        session.remove_line(0).unwrap();
        assert_eq!(session.line_count(), 1);
        assert_eq!(session.line_text(0), Some(""));
        assert!(!session.ends_in_string());
    }

    #[test]
    fn test_replace_text_resets_state() {
        let mut session = HighlightSession::new("'open\nstill");
        assert!(session.ends_in_string());

        assert_eq!(session.replace_text("x\ny\nz"), 3);
        assert_eq!(session.state_before(0), Some(ScanState::new()));
        assert!(!session.ends_in_string());
    }

    #[test]
    fn test_out_of_range_and_multiline() {
        let mut session = HighlightSession::new("a");
        assert_eq!(
            session.edit_line(1, "b"),
            Err(SessionError::LineOutOfRange {
                index: 1,
                line_count: 1
            })
        );
        assert!(session.insert_line(2, "b").is_err());
        assert!(session.remove_line(5).is_err());
        assert_eq!(session.edit_line(0, "b\nc"), Err(SessionError::MultiLineText));
        assert!(session.edit_line(0, "b\r").is_ok());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = HighlightSession::new("'open");
        let second = HighlightSession::new("closed");
        first.insert_line(1, "more").unwrap();
        assert!(first.ends_in_string());
        assert!(!second.ends_in_string());
    }
}
