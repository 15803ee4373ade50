//! Error handling for the plugin-builder CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use plugin_builder_core::error::BuilderError;

pub use plugin_builder_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `plugin-builder-core`.
    #[error("{0}")]
    Core(#[from] BuilderError),

    // ── System errors ──────────────────────────────────────────────────────
    /// Writing to the terminal failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ConfigError {
            message: format!("{err:#}"),
            source: None,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                format!(
                    "Check the config file (default: {})",
                    crate::config::AppConfig::config_path().display()
                ),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
            ],
        }
    }

    /// Get the error category for styling and log severity.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Source => ErrorCategory::Definition,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS. Every failure exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            self.category().label().red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        let mut source = self.source();
        while let Some(err) = source {
            output.push_str(&format!(
                "\n  {} {}\n",
                "→".dimmed(),
                err.to_string().dimmed()
            ));
            source = err.source();
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("\n{}: {}\n", self.category().label(), self));

        let mut src = std::error::Error::source(self);
        while let Some(err) = src {
            out.push_str(&format!("  Caused by: {err}\n"));
            src = err.source();
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        tracing::error!(category = ?self.category(), "{}", self);
        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A definition file is malformed or inconsistent.
    Definition,
    /// Project or file not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

impl ErrorCategory {
    fn label(self) -> &'static str {
        match self {
            Self::Definition => "Definition error",
            Self::NotFound => "Not found",
            Self::Configuration => "Configuration error",
            Self::Internal => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_builder_core::{application::ApplicationError, domain::DomainError};
    use std::{io, path::PathBuf};

    fn not_found() -> CliError {
        BuilderError::from(ApplicationError::ProjectNotFound {
            path: PathBuf::from("/tmp/p/sdk_plugins"),
        })
        .into()
    }

    #[test]
    fn core_errors_keep_their_suggestions() {
        let err = not_found();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.suggestions().iter().any(|s| s.contains("init")));
    }

    #[test]
    fn definition_errors_are_categorized() {
        let err: CliError = BuilderError::from(DomainError::CycleDetected {
            graph: "{'A': ['A']}".into(),
        })
        .into();
        assert_eq!(err.category(), ErrorCategory::Definition);
    }

    #[test]
    fn every_error_exits_with_one() {
        assert_eq!(not_found().exit_code(), 1);
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            1
        );
        assert_eq!(
            CliError::from(io::Error::new(io::ErrorKind::Other, "e")).exit_code(),
            1
        );
    }

    #[test]
    fn format_plain_has_message_and_suggestions() {
        let s = not_found().format_plain();
        assert!(s.contains("Not found: Project not found at /tmp/p/sdk_plugins"));
        assert!(s.contains("Suggestions:"));
    }

    #[test]
    fn anyhow_errors_become_config_errors() {
        let err: CliError = anyhow::anyhow!("bad toml").into();
        assert!(matches!(err, CliError::ConfigError { .. }));
        assert!(err.to_string().contains("bad toml"));
    }
}
