//! Application ports (traits) for external dependencies.
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: reading definitions, writing libs and documents
//!   - `DocumentEncoder`: document text format
//!   - `StarterKit`: files of a new project
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{DocumentEncoder, Filesystem, StarterKit};

#[cfg(test)]
pub use output::{MockDocumentEncoder, MockFilesystem, MockStarterKit};
