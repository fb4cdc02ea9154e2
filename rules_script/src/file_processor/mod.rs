//! File processor: loads rules files under compile-time size limits

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::log_debug;
pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

pub fn create_processor() -> FileProcessor {
    FileProcessor::new()
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

/// Check that every file processing code is registered (for startup)
pub fn init_file_processor_logging() -> Result<(), String> {
    use crate::logging::codes::{self, file_processing};

    let test_codes = [
        file_processing::FILE_NOT_FOUND,
        file_processing::INVALID_EXTENSION,
        file_processing::FILE_TOO_LARGE,
        file_processing::EMPTY_FILE,
        file_processing::PERMISSION_DENIED,
        file_processing::INVALID_ENCODING,
        file_processing::IO_ERROR,
        file_processing::INVALID_PATH,
        file_processing::TOO_MANY_LINES,
    ];

    for code in &test_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.jre");
        fs::write(&file_path, "RULE \"x\"\n  SCORE: 1\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        // The trailing newline opens an empty final line
        assert_eq!(result.metadata.line_count, 3);
        assert!(result.metadata.is_rules_file);
    }

    #[test]
    fn test_error_helpers() {
        let error = FileProcessorError::FileNotFound {
            path: "test.rules".to_string(),
        };
        assert!(should_halt_on_error(&error));
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_compile_time_constants_access() {
        assert_eq!(get_max_file_size(), FileProcessor::max_file_size());
        assert!(get_large_file_threshold() <= get_max_file_size());
        assert!(create_processor().enable_performance_logging);
    }

    #[test]
    fn test_init_file_processor_logging() {
        assert_eq!(init_file_processor_logging(), Ok(()));
    }
}
