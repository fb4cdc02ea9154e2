//! Rules file loading with compile-time size limits

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::mode::find_mode_by_extension;
use crate::utils::split_lines;
use crate::{log_debug, log_error, log_success};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .rules or .jre, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lower-cased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    /// Extension belongs to a registered Rules Script mode
    pub is_rules_file: bool,
    pub modified: Option<DateTime<Utc>>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable_bytes(self.size)
    }

    /// Above the compile-time large file threshold
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Loaded source plus what was learned about the file
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

pub struct FileProcessor {
    pub require_rules_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_rules_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_rules_extension: prefs.require_rules_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_rules_extension_required(mut self, required: bool) -> Self {
        self.require_rules_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn max_line_count() -> usize {
        MAX_LINE_COUNT
    }

    /// Validate, read and measure a rules file. Checks run in order: path,
    /// metadata, size, emptiness, extension, encoding, line count.
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let started = std::time::Instant::now();
        log_debug!("Loading rules file", "file" => file_path);

        let path = resolve_path(file_path)?;
        let mut metadata = read_metadata(&path)?;
        self.check_metadata(&metadata, file_path)?;

        let source = fs::read_to_string(&path).map_err(|e| io_failure(&path, e))?;
        metadata.line_count = split_lines(&source).count();
        if metadata.line_count > MAX_LINE_COUNT {
            return Err(reject(
                FileProcessorError::TooManyLines {
                    lines: metadata.line_count,
                    max_lines: MAX_LINE_COUNT,
                },
                file_path,
            ));
        }

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: started.elapsed(),
        };
        self.report_loaded(&result, file_path);
        Ok(result)
    }

    fn check_metadata(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            log_debug!("Size limit exceeded",
                "size_human" => metadata.human_readable_size(),
                "limit_human" => human_readable_bytes(MAX_FILE_SIZE)
            );
            return Err(reject(
                FileProcessorError::FileTooLarge {
                    size: metadata.size,
                    max_size: MAX_FILE_SIZE,
                },
                file_path,
            ));
        }
        if metadata.size == 0 {
            return Err(reject(FileProcessorError::EmptyFile, file_path));
        }
        if self.require_rules_extension && !metadata.is_rules_file {
            let extension = metadata.extension.clone();
            return Err(reject(
                FileProcessorError::InvalidExtension { extension },
                file_path,
            ));
        }
        Ok(())
    }

    fn report_loaded(&self, result: &FileProcessingResult, file_path: &str) {
        let elapsed_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
        let metadata = &result.metadata;

        if !self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Rules file loaded",
                "file" => file_path,
                "lines" => metadata.line_count
            );
            return;
        }

        log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Rules file loaded",
            "file" => file_path,
            "lines" => metadata.line_count,
            "size" => metadata.human_readable_size(),
            "large" => metadata.is_large_file(),
            "elapsed_ms" => elapsed_ms,
            "chars_per_ms" => format!("{:.2}", result.processing_rate())
        );
    }
}

/// Log `error` against `file_path` and hand it back
fn reject(error: FileProcessorError, file_path: &str) -> FileProcessorError {
    log_error!(error.error_code(), &error.to_string(), "file" => file_path);
    error
}

fn io_failure(path: &Path, err: std::io::Error) -> FileProcessorError {
    let shown = path.display().to_string();
    let error = match err.kind() {
        ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path: shown.clone() },
        ErrorKind::InvalidData => FileProcessorError::InvalidEncoding { path: shown.clone() },
        _ => FileProcessorError::IoError {
            message: format!("{shown}: {err}"),
        },
    };
    reject(error, &shown)
}

fn resolve_path(file_path: &str) -> Result<PathBuf, FileProcessorError> {
    let invalid = || FileProcessorError::InvalidPath {
        path: file_path.to_string(),
    };

    if file_path.is_empty() {
        return Err(reject(invalid(), file_path));
    }
    let path = Path::new(file_path);
    if !path.exists() {
        let missing = FileProcessorError::FileNotFound {
            path: file_path.to_string(),
        };
        return Err(reject(missing, file_path));
    }
    if !path.is_file() {
        return Err(reject(invalid(), file_path));
    }
    path.canonicalize().map_err(|e| io_failure(path, e))
}

fn read_metadata(path: &Path) -> Result<FileMetadata, FileProcessorError> {
    let fs_metadata = fs::metadata(path).map_err(|e| io_failure(path, e))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let is_rules_file = extension
        .as_deref()
        .is_some_and(|ext| find_mode_by_extension(ext).is_some());

    let metadata = FileMetadata {
        path: path.to_path_buf(),
        size: fs_metadata.len(),
        extension,
        line_count: 0,
        is_rules_file,
        modified: fs_metadata.modified().ok().map(DateTime::<Utc>::from),
    };

    log_debug!("Rules file metadata",
        "size" => metadata.human_readable_size(),
        "extension" => metadata.extension.as_deref().unwrap_or("none"),
        "rules_file" => is_rules_file
    );
    Ok(metadata)
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
