//! Error types for the archive pipelines
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the keyed archive layer
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// File system errors
    #[error("Failed to open archive '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error on archive '{locator}': {source}")]
    Io {
        locator: String,
        source: std::io::Error,
    },

    /// Locator errors
    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// Format errors
    #[error("Malformed archive '{locator}' near record {record}: {reason}")]
    InvalidFormat {
        locator: String,
        record: usize,
        reason: String,
    },

    #[error("Invalid key '{key}': keys must be non-empty and contain no whitespace")]
    InvalidKey { key: String },

    /// Lookup errors
    #[error("Key '{key}' not found in archive '{locator}'")]
    KeyNotFound { locator: String, key: String },
}

/// Errors raised by the pipelines themselves
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The two input streams disagree on the current key
    #[error("Mismatched utterances {left} and {right}")]
    KeyMismatch { left: String, right: String },

    /// A group references a key the vector store does not hold
    #[error("No vector present in input for member '{member}' of group '{group}'")]
    MissingVector { group: String, member: String },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ArchiveError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::Open { .. } => "ARCHIVE_OPEN_ERROR",
            Self::Io { .. } => "ARCHIVE_IO_ERROR",
            Self::InvalidLocator { .. } => "INVALID_LOCATOR",
            Self::InvalidFormat { .. } => "ARCHIVE_CORRUPTED",
            Self::InvalidKey { .. } => "INVALID_KEY",
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Open { .. } => vec![
                "Check that the archive exists and you have read permissions",
                "Use '-' to read from stdin or write to stdout",
            ],
            Self::InvalidLocator { .. } => vec![
                "Locators look like 'ark:path', 'ark,t:path' or a bare path",
                "Supported options are t (text), b (binary) and f (flush)",
                "'scp:' scripts can only be used where vectors are looked up by key",
            ],
            Self::InvalidFormat { .. } => vec![
                "Re-create the archive, it may be truncated",
                "Run 'vecpipe copy' on the archive to locate the bad record",
            ],
            Self::InvalidKey { .. } => vec!["Rename keys so they contain no spaces or tabs"],
            _ => vec![],
        }
    }
}

impl PipelineError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::KeyMismatch { .. } => "KEY_MISMATCH".to_string(),
            Self::MissingVector { .. } => "MISSING_VECTOR".to_string(),
            Self::Archive(e) => e.status_code(),
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::KeyMismatch { .. } => vec![
                "Both inputs must list the same keys in the same order",
                "Sort both archives by key before appending",
            ],
            Self::MissingVector { .. } => vec![
                "Every member listed in the group archive needs a vector",
                "Filter the group archive down to keys present in the vector archive",
            ],
            Self::Archive(e) => e.recovery_suggestions(),
        }
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Result type alias for pipeline runs
pub type PipelineResult<T> = Result<T, PipelineError>;
