//! Error types for the exercise playground service
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for request-handling operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required request parameter was absent
    #[error("Missing required parameter '{name}'")]
    MissingParameter { name: &'static str },

    /// The logical ref could not be turned into a usable relative path
    #[error("Invalid file reference '{file}'")]
    InvalidRef { file: String },

    /// Neither the playground overlay nor the source tree has the file
    #[error("File '{file}' not found in playground or source tree")]
    FileNotFound { file: String },

    /// The source tree has no entry for this ref (copy/reset operations)
    #[error("Source file '{file}' not found")]
    SourceNotFound { file: String },

    /// The directory a task's files live in does not exist
    #[error("Task directory '{path}' not found")]
    TaskDirNotFound { path: PathBuf },

    /// File system errors
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to reset '{path}': {source}")]
    Reset {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The external editor could not be launched
    #[error("Failed to open external editor '{tool}': {detail}")]
    EditorFailed { tool: String, detail: String },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },
}

impl ServiceError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "MISSING_PARAMETER",
            Self::InvalidRef { .. } => "INVALID_REF",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            Self::TaskDirNotFound { .. } => "TASK_DIR_NOT_FOUND",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::Reset { .. } => "RESET_ERROR",
            Self::EditorFailed { .. } => "EDITOR_FAILED",
            Self::ConfigError { .. } => "CONFIG_ERROR",
        }
    }

    /// True when the error means "nothing at that address", as opposed to
    /// a malformed request or an I/O fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::SourceNotFound { .. } | Self::TaskDirNotFound { .. }
        )
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Helper trait for converting I/O errors while keeping the path
pub trait IoContext<T> {
    /// Convert a read failure, attaching the path being read
    fn read_context(self, path: &std::path::Path) -> ServiceResult<T>;

    /// Convert a write failure, attaching the path being written
    fn write_context(self, path: &std::path::Path) -> ServiceResult<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn read_context(self, path: &std::path::Path) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write_context(self, path: &std::path::Path) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
