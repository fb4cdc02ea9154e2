// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod highlight;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod mode;
pub mod pipeline;
pub mod session;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use highlight::{render_html, render_line};
pub use lexical::{scan, scan_line, LexicalAnalyzer, LineStream, LineToken, ScanState};
pub use mode::{find_mode_by_extension, find_mode_by_mime, find_mode_by_name, LanguageMode};
pub use pipeline::{DocumentResult, PipelineError};
pub use session::{HighlightSession, SessionError};
pub use tokens::{Token, TokenKind, TokenStream};
