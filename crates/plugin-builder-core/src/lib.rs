//! Plugin Builder Core - Hexagonal Architecture Implementation
//!
//! This crate reads plugin definition files (records, scenarios, daemons
//! and modules written as Python classes) without executing them, and
//! turns them into configuration documents plus the generated `libs`
//! package the definitions import.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        plugin-builder-cli (CLI)         │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │       (BuildService, InitService)       │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (Filesystem, DocumentEncoder, Starter)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    plugin-builder-adapters (Infra)      │
//! └─────────────────────────────────────────┘
//!
//!   source ─▶ loader ─▶ domain ─▶ emit      (pure, no I/O)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use plugin_builder_core::{application::BuildService, emit::ScaffoldOptions};
//!
//! # fn run(
//! #     filesystem: Box<dyn plugin_builder_core::application::Filesystem>,
//! #     encoder: Box<dyn plugin_builder_core::application::DocumentEncoder>,
//! # ) -> plugin_builder_core::error::BuilderResult<()> {
//! let service = BuildService::new(filesystem, encoder, ScaffoldOptions::default());
//! service.dump(Path::new("./project"), Path::new("./out"))?;
//! # Ok(())
//! # }
//! ```

pub mod source;

pub mod domain;

pub mod loader;

pub mod emit;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BuildReport, BuildService, InitService,
        ports::{DocumentEncoder, Filesystem, StarterKit},
    };
    pub use crate::domain::{
        DefinitionKind, DefinitionUnit, OutputFile, OutputTree, RecordGraph, RelativePath,
    };
    pub use crate::emit::{RenderContext, ScaffoldOptions};
    pub use crate::error::{BuilderError, BuilderResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
