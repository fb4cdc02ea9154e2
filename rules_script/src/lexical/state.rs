//! Scanner state carried from one line to the next

use serde::{Deserialize, Serialize};

/// Per-document scan state. The only cross-line construct in Rules Script is
/// a string literal left open at the end of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanState {
    string_char: Option<char>,
}

impl ScanState {
    /// State at the start of a document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_string(&self) -> bool {
        self.string_char.is_some()
    }

    /// Quote character that will close the open string
    pub fn string_char(&self) -> Option<char> {
        self.string_char
    }

    pub fn enter_string(&mut self, quote: char) {
        self.string_char = Some(quote);
    }

    pub fn leave_string(&mut self) {
        self.string_char = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
