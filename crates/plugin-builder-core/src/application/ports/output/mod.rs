//! Driven (output) ports - implemented by infrastructure.
//!
//! The `plugin-builder-adapters` crate provides the implementations.

use std::path::Path;

use serde_json::Value;

use crate::domain::{OutputTree, RelativePath};
use crate::error::BuilderResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `plugin_builder_adapters::filesystem::LocalFilesystem` (production)
/// - `plugin_builder_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> BuilderResult<()>;

    /// Write content to a file, replacing it if it exists.
    fn write_file(&self, path: &Path, content: &str) -> BuilderResult<()>;

    fn read_to_string(&self, path: &Path) -> BuilderResult<String>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a directory and all contents. Missing directories are fine.
    fn remove_dir_all(&self, path: &Path) -> BuilderResult<()>;

    /// Every regular file below `root`, relative to it, sorted.
    fn list_files(&self, root: &Path) -> BuilderResult<Vec<RelativePath>>;
}

/// Port for turning documents into text.
///
/// Implemented by `plugin_builder_adapters::encoder::YamlEncoder`.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentEncoder: Send + Sync {
    /// Encode one document. `name` is only used in error messages.
    fn encode(&self, name: &str, document: &Value) -> BuilderResult<String>;

    /// File extension of encoded documents, without the dot.
    fn extension(&self) -> &'static str;
}

/// Port for the files `init` lays down in a new project.
///
/// Contents may carry `{{KEY}}` placeholders; the init service renders
/// them before writing.
///
/// Implemented by `plugin_builder_adapters::starter::BuiltinStarterKit`.
#[cfg_attr(test, mockall::automock)]
pub trait StarterKit: Send + Sync {
    /// Files relative to the plugin root.
    fn files(&self) -> BuilderResult<OutputTree>;
}
