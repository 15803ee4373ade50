//! Local filesystem adapter using std::fs and walkdir.

use std::io;
use std::path::Path;

use plugin_builder_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::RelativePath,
    error::{BuilderError, BuilderResult},
};
use tracing::trace;
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> BuilderResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> BuilderResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> BuilderResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_dir_all(&self, path: &Path) -> BuilderResult<()> {
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other.map_err(|e| map_io_error(path, e, "remove directory")),
        }
    }

    fn list_files(&self, root: &Path) -> BuilderResult<Vec<RelativePath>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                map_io_error(&path, e.into(), "walk directory")
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            // Entries always sit below the root they were walked from.
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            trace!(path = %relative.display(), "listed");
            files.push(RelativePath::try_new(relative)?);
        }
        files.sort();
        Ok(files)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> BuilderError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_nested_files_relative_and_sorted() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("plugins/default/classes/default");
        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&nested.join("User.py"), "x").unwrap();
        fs.write_file(&dir.path().join("plugins/a.py"), "y").unwrap();

        let files = fs.list_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                RelativePath::new("plugins/a.py"),
                RelativePath::new("plugins/default/classes/default/User.py"),
            ]
        );
    }

    #[test]
    fn removing_a_missing_directory_is_fine() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(fs.remove_dir_all(&dir.path().join("libs")).is_ok());
    }

    #[test]
    fn read_errors_carry_the_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.py");
        let err = LocalFilesystem::new().read_to_string(&missing).unwrap_err();
        assert!(matches!(
            err,
            BuilderError::Application(ApplicationError::FilesystemError { ref path, .. })
                if *path == missing
        ));
    }
}
