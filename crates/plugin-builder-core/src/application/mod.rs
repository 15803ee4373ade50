//! Application layer for the plugin builder.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (BuildService, InitService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer sequences loading, resolution and emission but
//! holds no rules of its own. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{BuildReport, BuildService, InitService};

// Re-export port traits (for adapter implementation)
pub use ports::{DocumentEncoder, Filesystem, StarterKit};

pub use error::ApplicationError;
