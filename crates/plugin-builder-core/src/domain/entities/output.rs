use std::collections::HashSet;

use crate::domain::{common::RelativePath, error::DomainError};

/// A set of files ready to be written below one output directory.
///
/// The tree carries no behavior beyond validation; services decide where
/// it is materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTree {
    files: Vec<OutputFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: RelativePath,
    pub content: String,
}

impl OutputTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: RelativePath, content: impl Into<String>) {
        self.files.push(OutputFile {
            path,
            content: content.into(),
        });
    }

    pub fn with_file(mut self, path: RelativePath, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    /// Rejects two files at the same path.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for file in &self.files {
            if !seen.insert(&file.path) {
                return Err(DomainError::DuplicatePath {
                    path: file.path.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &OutputFile> {
        self.files.iter()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path.as_path() == std::path::Path::new(path))
            .map(|f| f.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
