//! Log events emitted by the lexer driver, file processor and batch runner

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

pub const GENERIC_WARNING: Code = Code::new("W000");
pub const GENERIC_INFO: Code = Code::new("I000");
pub const GENERIC_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn with_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: HashMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Error, code, message)
    }

    /// Warning under the generic `W000` code
    pub fn warning(message: &str) -> Self {
        Self::with_level(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Warning, code, message)
    }

    /// Info under the generic `I000` code
    pub fn info(message: &str) -> Self {
        Self::with_level(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Info event carrying one of the `I0xx` success codes
    pub fn success(code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::with_level(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(self, span: Span) -> Self {
        Self {
            span: Some(span),
            ..self
        }
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_file_path(self, path: &str) -> Self {
        self.with_context("file_path", path)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.level, LogLevel::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.level, LogLevel::Warning)
    }

    pub fn is_info(&self) -> bool {
        matches!(self.level, LogLevel::Info)
    }

    pub fn is_debug(&self) -> bool {
        matches!(self.level, LogLevel::Debug)
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// `[LEVEL] CODE - message`, plus ` at line:col` when a span is attached
    pub fn format(&self) -> String {
        let mut line = format!("[{}] {} - {}", self.level.as_str(), self.code, self.message);
        if let Some(span) = &self.span {
            let start = span.start();
            line.push_str(&format!(" at {}:{}", start.line, start.column));
        }
        line
    }

    /// JSON object on one line. Errors also carry recoverability and the
    /// registry's recommended action.
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let handling = self.is_error().then(|| ErrorHandling {
            recoverable: self.is_recoverable(),
            requires_halt: self.requires_halt(),
            action: codes::get_action(self.code.as_str()),
        });
        let mut context: Vec<(&str, &str)> = self
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        context.sort_unstable();

        serde_json::to_string(&JsonEvent {
            timestamp: self.timestamp,
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            span: self.span.as_ref(),
            context: context.into_iter().collect(),
            error: handling,
        })
    }
}

#[derive(Serialize)]
struct ErrorHandling {
    recoverable: bool,
    requires_halt: bool,
    action: &'static str,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: DateTime<Utc>,
    level: &'static str,
    code: &'static str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<&'a Span>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorHandling>,
}
