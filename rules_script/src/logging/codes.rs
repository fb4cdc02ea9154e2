//! Error and success codes for the Rules Script toolchain
//!
//! Every code the crate emits is declared here together with its behavioral
//! metadata (category, severity, recoverability, halt requirement).

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Wrapper shared by error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Metadata attached to a registered code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Lexical driver codes. The scanner itself never fails; these cover the
/// document-level resource limits and advisory warnings.
pub mod lexical {
    use super::Code;

    pub const DOCUMENT_TOO_LARGE: Code = Code::new("E020");
    pub const LINE_TOO_LONG: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E022");

    pub const UNTERMINATED_STRING: Code = Code::new("W020");
}

pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E030");
    pub const NO_RULE_FILES: Code = Code::new("E031");
    pub const TOO_MANY_FILES: Code = Code::new("E032");
    pub const WORKER_FAILURE: Code = Code::new("E033");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const HIGHLIGHT_RENDERED: Code = Code::new("I021");

    pub const BATCH_COMPLETE: Code = Code::new("I030");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const REGISTERED_CODES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Internal error in the rules toolchain",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Logging or runtime initialization failed",
        "Check runtime configuration and environment variables",
    ),
    ErrorMetadata::new(
        "ERR003",
        "System",
        Severity::High,
        false,
        true,
        "Runtime configuration could not be loaded",
        "Fix the TOML configuration file or remove the --config flag",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "Rules file not found at specified path",
        "Check the file path",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "File does not have a .rules or .jre extension",
        "Rename the file or disable the extension requirement",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "File exceeds the configured maximum size",
        "Split the rule set into smaller files",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "File is empty",
        "Add rule definitions to the file",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "Permission denied while reading file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "File is not valid UTF-8",
        "Re-save the file with UTF-8 encoding",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "I/O error while reading file",
        "Check disk and filesystem health",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "Path is not a regular file",
        "Pass a path to a rules file",
    ),
    ErrorMetadata::new(
        "E013",
        "FileProcessing",
        Severity::High,
        false,
        true,
        "File exceeds the configured maximum line count",
        "Split the rule set into smaller files",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::High,
        false,
        true,
        "Document exceeds the maximum size accepted by the lexer",
        "Split the document or raise lexical.max_document_size",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::High,
        false,
        true,
        "Line exceeds the maximum length accepted by the lexer",
        "Break the line or raise lexical.max_line_length",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::High,
        false,
        true,
        "Document produced more tokens than allowed",
        "Split the document or raise lexical.max_token_count",
    ),
    ErrorMetadata::new(
        "W020",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Document ends inside an open string literal",
        "Add the closing quote",
    ),
    // Batch
    ErrorMetadata::new(
        "E030",
        "Batch",
        Severity::Medium,
        false,
        true,
        "Batch directory not found",
        "Check the directory path",
    ),
    ErrorMetadata::new(
        "E031",
        "Batch",
        Severity::Low,
        true,
        false,
        "No rules files found in directory",
        "Check the directory contents and recursion setting",
    ),
    ErrorMetadata::new(
        "E032",
        "Batch",
        Severity::Medium,
        true,
        false,
        "Directory contains more files than the batch limit",
        "Lower the file count or raise batch_processing.max_files_per_batch",
    ),
    ErrorMetadata::new(
        "E033",
        "Batch",
        Severity::High,
        false,
        true,
        "A batch worker thread failed",
        "Re-run sequentially with --threads 1 to isolate the file",
    ),
    // Success
    ErrorMetadata::new(
        "I001",
        "Success",
        Severity::Low,
        true,
        false,
        "Operation completed successfully",
        "None",
    ),
    ErrorMetadata::new(
        "I004",
        "Success",
        Severity::Low,
        true,
        false,
        "Logging initialized",
        "None",
    ),
    ErrorMetadata::new(
        "I006",
        "Success",
        Severity::Low,
        true,
        false,
        "File read successfully",
        "None",
    ),
    ErrorMetadata::new(
        "I007",
        "Success",
        Severity::Low,
        true,
        false,
        "File passed validation",
        "None",
    ),
    ErrorMetadata::new(
        "I020",
        "Success",
        Severity::Low,
        true,
        false,
        "Document tokenized",
        "None",
    ),
    ErrorMetadata::new(
        "I021",
        "Success",
        Severity::Low,
        true,
        false,
        "Highlight output rendered",
        "None",
    ),
    ErrorMetadata::new(
        "I030",
        "Success",
        Severity::Low,
        true,
        false,
        "Batch completed",
        "None",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTERED_CODES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Severity of a code, `Medium` when unregistered
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let declared = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::INVALID_EXTENSION,
            file_processing::FILE_TOO_LARGE,
            file_processing::EMPTY_FILE,
            file_processing::PERMISSION_DENIED,
            file_processing::INVALID_ENCODING,
            file_processing::IO_ERROR,
            file_processing::INVALID_PATH,
            file_processing::TOO_MANY_LINES,
            lexical::DOCUMENT_TOO_LARGE,
            lexical::LINE_TOO_LONG,
            lexical::TOO_MANY_TOKENS,
            lexical::UNTERMINATED_STRING,
            batch::DIRECTORY_NOT_FOUND,
            batch::NO_RULE_FILES,
            batch::TOO_MANY_FILES,
            batch::WORKER_FAILURE,
            success::OPERATION_COMPLETED_SUCCESSFULLY,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::FILE_PROCESSING_SUCCESS,
            success::FILE_VALIDATION_PASSED,
            success::TOKENIZATION_COMPLETE,
            success::HIGHLIGHT_RENDERED,
            success::BATCH_COMPLETE,
        ];

        for code in declared {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "code {} has no metadata",
                code
            );
        }
        assert_eq!(get_error_registry().len(), REGISTERED_CODES.len());
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert!(is_recoverable("X999"));
        assert!(!requires_halt("X999"));
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
    }

    #[test]
    fn test_unterminated_string_is_advisory() {
        let code = lexical::UNTERMINATED_STRING.as_str();
        assert!(is_recoverable(code));
        assert!(!requires_halt(code));
        assert_eq!(get_category(code), "Lexical");
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("High"), Some(Severity::High));
        assert_eq!(Severity::parse(Severity::Low.as_str()), Some(Severity::Low));
        assert_eq!(Severity::parse("high"), None);
    }
}
