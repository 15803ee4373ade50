//! Unified error handling for the plugin builder core.
//!
//! [`BuilderError`] wraps domain and application errors so callers deal
//! with one type, and keeps the user-facing suggestions of both layers.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

/// Root error type for core operations.
#[derive(Debug, Error, Clone)]
pub enum BuilderError {
    /// A definition file violates a structural rule.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Orchestration failed (filesystem, encoding, project layout).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl BuilderError {
    /// User-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in plugin-builder".into()],
        }
    }

    /// Error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                domain::ErrorCategory::StructuralDuplicate
                | domain::ErrorCategory::Shape
                | domain::ErrorCategory::Cycle => ErrorCategory::Validation,
                domain::ErrorCategory::Reference => ErrorCategory::NotFound,
                domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                domain::ErrorCategory::Extraction => ErrorCategory::Source,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    /// A definition file could not be read as Python source.
    Source,
    Internal,
}

/// Convenient result type alias.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> BuilderResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> BuilderResult<T> {
        self.map_err(|e| BuilderError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn domain_errors_keep_their_message_and_category() {
        let err: BuilderError = DomainError::CycleDetected {
            graph: "{'A': ['A']}".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Cycles detected: {'A': ['A']}");
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: BuilderError = DomainError::MissingEntity {
            entity: "ScenarioHeader".into(),
            file: "x.py".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn application_errors_convert() {
        let err: BuilderError = ApplicationError::ProjectNotFound {
            path: PathBuf::from("/missing"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.context("reading config").unwrap_err();
        assert!(matches!(err, BuilderError::Internal { .. }));
        assert!(err.to_string().contains("reading config: boom"));
    }
}
