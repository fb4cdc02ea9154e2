//! Source location tracking
//!
//! Offsets are bytes into the document. Lines and columns are 1-based, and
//! columns count characters, so they line up with what an editor displays.

use super::lines::split_lines;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number in characters (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Move past `text` on the same line
    pub fn advance_str(self, text: &str) -> Self {
        Self {
            offset: self.offset + text.len(),
            line: self.line,
            column: self.column + text.chars().count() as u32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range `[start, end)` of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Source text for this span, `None` when out of range or off a char boundary
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Line index over a document for offset lookups and error excerpts
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// (start offset, end offset excluding terminator) per line
    lines: Vec<(usize, usize)>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let lines = split_lines(&source)
            .map(|line| (line.offset, line.offset + line.text.len()))
            .collect();
        Self { source, lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Position of a byte offset. Offsets inside a line terminator map to the
    /// end of that line.
    pub fn position_at(&self, offset: usize) -> Position {
        let line_idx = match self.lines.binary_search_by(|(start, _)| start.cmp(&offset)) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };

        let (start, end) = self.lines.get(line_idx).copied().unwrap_or((0, 0));
        let clamped = offset.clamp(start, end);
        let column = self
            .source
            .get(start..clamped)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        Position::new(offset, (line_idx + 1) as u32, (column + 1) as u32)
    }

    /// Text of a 1-based line without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let idx = (line_num as usize).checked_sub(1)?;
        let (start, end) = *self.lines.get(idx)?;
        self.source.get(start..end)
    }

    pub fn span_text(&self, span: &Span) -> Option<&str> {
        span.slice(&self.source)
    }

    /// Message followed by the offending line with a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = format!(
            "error: {}\n  --> {}:{}\n",
            message, span.start.line, span.start.column
        );

        if let Some(line) = self.get_line(span.start.line) {
            let number = span.start.line.to_string();
            let gutter = " ".repeat(number.len());

            let width = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line.chars().count() + 1 - span.start.column as usize
            };

            result.push_str(&format!("{} |\n", gutter));
            result.push_str(&format!("{} | {}\n", number, line));
            result.push_str(&format!(
                "{} | {}{}\n",
                gutter,
                " ".repeat(span.start.column.saturating_sub(1) as usize),
                "^".repeat(width.max(1))
            ));
        }

        result
    }
}
