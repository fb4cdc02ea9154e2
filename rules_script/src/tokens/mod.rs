//! Token types produced by the document analyzer
//!
//! - [`TokenKind`] is the classification the scanner returns for each span
//! - [`Token`] pairs a kind with the exact source text it covers
//! - [`TokenStream`] holds a scanned document and offers parser-style
//!   navigation over its significant tokens

pub mod kind;
pub mod token_stream;

pub use kind::TokenKind;
pub use token_stream::{SpannedToken, Token, TokenCounts, TokenStream};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
