//! Batch processing of rules file directories
//!
//! Discovers `.rules` and `.jre` files, validates them and runs each through
//! the pipeline either sequentially or on worker threads. Every document is
//! tokenized by its own analyzer from a fresh scan state.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences};
use crate::logging::{codes, Code};
use crate::mode::find_mode_by_extension;
use crate::pipeline::{self, DocumentResult, PipelineError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    /// Log an info event before each file
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub file_preferences: FileProcessorPreferences,
    pub lexical_preferences: LexicalPreferences,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            file_preferences: FileProcessorPreferences::default(),
            lexical_preferences: LexicalPreferences::default(),
        }
    }
}

impl BatchConfig {
    /// Thread count clamped to `1..=MAX_WORKER_THREADS`
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

#[derive(Debug)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, DocumentResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    /// Files rejected before processing, with the reason
    pub skipped_files: Vec<(PathBuf, String)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful_files: Vec::new(),
            failed_files: Vec::new(),
            skipped_files: Vec::new(),
            processing_duration: Duration::new(0, 0),
            files_processed: 0,
            files_discovered: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: DocumentResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.skipped_files.extend(other.skipped_files);
        self.files_processed += other.files_processed;
    }

    /// Order results by path; parallel runs finish in any order
    pub fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn total_tokens(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, result)| result.token_count())
            .sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {} skipped, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.skipped_files.len(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No rules files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_RULE_FILES,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::ThreadError { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

/// Lock that survives a worker panicking while holding it
fn lock_results(results: &Mutex<BatchResults>) -> MutexGuard<'_, BatchResults> {
    results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover rules files under `dir_path`, sorted by path
pub fn discover_rules_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), "Batch directory not found",
            "directory" => dir_path.display());
        return Err(error);
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        let error = BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), "No rules files found",
            "directory" => dir_path.display());
        return Err(error);
    }

    if files.len() > MAX_FILES_PER_BATCH {
        let error = BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        };
        crate::log_error!(error.error_code(), "Batch exceeds maximum file count",
            "files_found" => files.len(),
            "limit" => MAX_FILES_PER_BATCH
        );
        return Err(error);
    }

    files.sort();

    crate::log_success!(
        codes::success::FILE_VALIDATION_PASSED,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

/// Collect rules files; returns `false` once `max_files` is reached
fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<bool, BatchError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir_path)
        .and_then(|entries| entries.map(|entry| entry.map(|e| e.path())).collect())
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
    // Stable traversal so `max_files` keeps the same files on every run
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if config.recursive && !visit_directory(&path, files, config)? {
                return Ok(false);
            }
        } else if is_rules_file(&path) {
            files.push(path);

            if let Some(max_files) = config.max_files {
                if files.len() >= max_files {
                    crate::log_warning!(
                        "Reached maximum file limit",
                        "files_found" => files.len(),
                        "limit" => max_files
                    );
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

pub fn is_rules_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| find_mode_by_extension(ext).is_some())
}

fn validate_files(files: &[PathBuf]) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut valid_files = Vec::new();
    let mut invalid_files = Vec::new();

    for file in files {
        match validate_single_file(file) {
            Ok(()) => valid_files.push(file.clone()),
            Err(reason) => invalid_files.push((file.clone(), reason)),
        }
    }

    if !invalid_files.is_empty() {
        crate::log_warning!(
            "Some files failed validation",
            "valid_files" => valid_files.len(),
            "invalid_files" => invalid_files.len()
        );
    }

    (valid_files, invalid_files)
}

fn validate_single_file(file_path: &Path) -> Result<(), String> {
    if !file_path.is_file() {
        return Err("Path is not a file".to_string());
    }

    let metadata =
        fs::metadata(file_path).map_err(|e| format!("Cannot read file metadata: {}", e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(format!(
            "File too large: {} bytes (max: {} bytes)",
            metadata.len(),
            MAX_FILE_SIZE
        ));
    }

    Ok(())
}

/// Discover and validate; invalid files are logged and recorded as skipped
fn prepare_batch(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<(Vec<PathBuf>, BatchResults), BatchError> {
    let discovered_files = discover_rules_files(dir_path, config)?;
    let (valid_files, invalid_files) = validate_files(&discovered_files);

    for (file_path, reason) in &invalid_files {
        crate::log_error!(
            codes::file_processing::INVALID_PATH,
            "File validation failed",
            "file" => file_path.display(),
            "reason" => reason
        );
    }

    let mut results = BatchResults::new();
    results.files_discovered = discovered_files.len();
    results.skipped_files = invalid_files;
    Ok((valid_files, results))
}

fn process_one(
    file_path: &Path,
    file_id: usize,
    config: &BatchConfig,
) -> Result<DocumentResult, PipelineError> {
    if config.progress_reporting {
        crate::log_info!("Processing file",
            "file" => file_path.display(),
            "file_id" => file_id
        );
    }
    pipeline::process_file_with_id(
        &file_path.to_string_lossy(),
        file_id,
        &config.file_preferences,
        config.lexical_preferences.clone(),
    )
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display()
    );

    let (valid_files, mut results) = prepare_batch(dir_path, config)?;

    for (file_id, file_path) in valid_files.iter().enumerate() {
        match process_one(file_path, file_id, config) {
            Ok(document) => results.add_success(file_path.clone(), document),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.effective_threads();

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let (valid_files, mut results) = prepare_batch(dir_path, config)?;

    let chunk_size = calculate_chunk_size(valid_files.len(), threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => valid_files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in valid_files.chunks(chunk_size).enumerate() {
        let chunk_results = process_chunk_parallel(chunk, chunk_index * chunk_size, config)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

/// Split `files` across worker threads; `first_file_id` numbers the chunk
fn process_chunk_parallel(
    files: &[PathBuf],
    first_file_id: usize,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let threads = config.effective_threads();
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads).max(1);

    let mut handles = Vec::new();
    for (thread_index, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let start_id = first_file_id + thread_index * files_per_thread;
        let results = Arc::clone(&results);
        let config = config.clone();

        handles.push(thread::spawn(move || {
            for (offset, file_path) in thread_files.into_iter().enumerate() {
                let outcome = process_one(&file_path, start_id + offset, &config);
                let mut guard = lock_results(&results);
                match outcome {
                    Ok(document) => guard.add_success(file_path, document),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| {
            let error = BatchError::ThreadError {
                message: "Worker thread panicked during processing".to_string(),
            };
            crate::log_error!(error.error_code(), "Batch worker failed");
            error
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to collect results from worker threads".to_string(),
    })?;
    Ok(results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner()))
}

fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    file_count
        .div_ceil(max_threads.max(1))
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "skipped" => results.skipped_files.len(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}
