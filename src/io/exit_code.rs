//! Exit codes for pipeline runs following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - the run produced output and nothing was left unmatched
//! - `1`: General error - the run finished but counts as unsuccessful
//! - `2`: Blocking error - the inputs disagree and automation should halt
//! - `3-125`: Specific errors
//! - `126-255`: Reserved by shell

use crate::error::{ArchiveError, PipelineError};

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Run succeeded (code 0)
    Success = 0,

    /// Run finished without output, or with leftover records (code 1)
    GeneralError = 1,

    /// Key mismatch or unresolved group member (code 2)
    BlockingError = 2,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Malformed archive data (code 7)
    ArchiveCorrupted = 7,

    /// Locator or option not supported (code 8)
    UnsupportedOperation = 8,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Convert a fatal `PipelineError` to the appropriate exit code.
    pub fn from_error(error: &PipelineError) -> Self {
        match error {
            PipelineError::KeyMismatch { .. } | PipelineError::MissingVector { .. } => {
                ExitCode::BlockingError
            }
            PipelineError::Archive(e) => Self::from_archive_error(e),
        }
    }

    pub fn from_archive_error(error: &ArchiveError) -> Self {
        match error {
            ArchiveError::Open { .. } | ArchiveError::Io { .. } => ExitCode::IoError,
            ArchiveError::InvalidFormat { .. } => ExitCode::ArchiveCorrupted,
            ArchiveError::InvalidLocator { .. } => ExitCode::UnsupportedOperation,
            ArchiveError::InvalidKey { .. } | ArchiveError::KeyNotFound { .. } => {
                ExitCode::GeneralError
            }
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}
