// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for the plugin builder.
//!
//! Pure logic over definition data: no filesystem access and no parsing of
//! source text (see [`crate::source`] and [`crate::loader`] for that).
//!
//! - **Entities**: definitions of the four kinds and the output tree
//! - **Discovery**: which relative paths are definitions
//! - **Resolve**: inheritance ordering of records
//! - **Normalize**: type and value spellings for documents and scaffolding
//! - **Validation**: checks spanning several definitions
pub mod common;
pub mod discovery;
pub mod entities;
pub mod error;
pub mod normalize;
pub mod resolve;

mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use common::RelativePath;
pub use discovery::{DiscoveredFile, discover};
pub use entities::*;
pub use error::{DomainError, ErrorCategory};
pub use resolve::{RecordGraph, topological_sort};
pub use validation::DomainValidator;
