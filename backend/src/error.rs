//! Error types for the Darwin Core export pipeline.
//!
//! This module defines one error type per concern:
//!
//! - [`InputError`] - Reading and decoding the raw occurrence file (fatal)
//! - [`ConfigError`] - Reasons a configuration file was replaced by its default (non-fatal)
//! - [`ExportError`] - Writing the CSV output
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Per-field normalization failures are not errors at all: every normalizer
//! returns an `Option` and absence is written as an empty cell.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Input Errors
// =============================================================================

/// Errors while loading the raw occurrence JSON.
#[derive(Debug, Error)]
pub enum InputError {
    /// The raw data file does not exist.
    #[error("Raw occurrence file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON.
    #[error("Malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Configuration Fallbacks
// =============================================================================

/// Why a configuration file was not used.
///
/// These never abort a run: the loader substitutes the built-in default and
/// keeps the reason around for logging.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file absent.
    #[error("Config absent: {}", .0.display())]
    Missing(PathBuf),

    /// Configuration file present but unreadable.
    #[error("Cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not JSON.
    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON is valid but has the wrong shape (list expected, got mapping, ...).
    #[error("Unexpected structure in {}: {}", path.display(), errors.join("; "))]
    ShapeMismatch { path: PathBuf, errors: Vec<String> },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while rendering or writing the CSV file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the output file failed.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::dwc_normalize_to_csv`].
/// Only missing or malformed input and output failures end up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raw input could not be loaded.
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// CSV output could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for input loading.
pub type InputResult<T> = Result<T, InputError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
