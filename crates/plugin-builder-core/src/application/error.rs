//! Application layer errors.
//!
//! These errors represent failures in orchestration, not in definition
//! files. Those are [`crate::domain::DomainError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The project directory (or its plugin root) does not exist.
    #[error("Project not found at {path}")]
    ProjectNotFound { path: PathBuf },

    /// A document could not be encoded.
    #[error("Failed to encode '{name}': {reason}")]
    EncodingFailed { name: String, reason: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::ProjectNotFound { path } => vec![
                format!("Directory does not exist: {}", path.display()),
                "Run 'plugin-builder init <project_path>' to create a project".into(),
            ],
            Self::EncodingFailed { .. } => {
                vec!["Check that every value in the definition is plain data".into()]
            }
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::EncodingFailed { .. } => ErrorCategory::Internal,
            Self::ProjectNotFound { .. } => ErrorCategory::NotFound,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
