//! Source positions, spans and line splitting shared by the lexer layers

pub mod lines;
pub mod span;

pub use lines::{split_lines, SourceLine};
pub use span::{Position, SourceMap, Span, Spanned};
