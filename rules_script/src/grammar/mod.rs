//! Lexical grammar of Rules Script: word tables and symbol sets

pub mod symbols;
pub mod words;

pub use symbols::{is_bracket, is_quote, OPERATORS};
pub use words::{classify_word, WordClass, BOOLEANS, CLAUSES, KEYWORDS, TYPES, WORD_TABLES};
