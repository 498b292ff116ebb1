//! Error types for NestDB core.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in NestDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No resource is stored under the namespace.
    #[error("no such resource: [{namespace}]")]
    NotFound {
        /// The namespace that was looked up.
        namespace: String,
    },

    /// A resource already exists under the namespace and overwriting was not requested.
    #[error("resource already exists: [{namespace}]")]
    AlreadyExists {
        /// The namespace that is already taken.
        namespace: String,
    },

    /// A document could not be decoded or is not a JSON object.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// The persistence file is locked by another process or attempt.
    #[error("persistence file locked: {}", path.display())]
    Locked {
        /// Path of the contended file.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted snapshot does not have the expected layout.
    #[error("invalid snapshot format in {}: {message}", path.display())]
    InvalidFormat {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Description of the format issue.
        message: String,
    },

    /// The snapshot could not be serialized.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(namespace: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
        }
    }

    /// Creates an already-exists error.
    pub fn already_exists(namespace: impl Into<String>) -> Self {
        Self::AlreadyExists {
            namespace: namespace.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a lock contention error.
    pub fn locked(path: &Path) -> Self {
        Self::Locked {
            path: path.to_path_buf(),
        }
    }

    /// Creates an invalid snapshot format error.
    pub fn invalid_format(path: &Path, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns true if the error was caused by the caller's input rather than
    /// by the store or the filesystem.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound { .. }
                | CoreError::AlreadyExists { .. }
                | CoreError::InvalidDocument { .. }
        )
    }
}
