//! Infrastructure adapters for the plugin builder.
//!
//! This crate implements the ports defined in
//! `plugin_builder_core::application::ports`. It contains all I/O.

pub mod encoder;
pub mod filesystem;
pub mod starter;

// Re-export commonly used adapters
pub use encoder::YamlEncoder;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use starter::{BuiltinStarterKit, DirectoryStarterKit, starter_kit};
