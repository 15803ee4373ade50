//! Matching of definition files below the plugin root.
//!
//! Walking the filesystem is an adapter concern (`Filesystem::list_files`);
//! this module only decides which relative paths are definitions, what
//! their default workspace and category are, and rejects duplicate stems.

use std::collections::HashSet;

use crate::domain::{
    common::RelativePath,
    entities::DefinitionKind,
    error::DomainError,
};

const PLUGINS_DIR: &str = "plugins";
const PACKAGE_MARKER: &str = "__init__.py";

/// A definition file found for one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredFile {
    pub path: RelativePath,
    pub kind: DefinitionKind,
    /// Segment right after `plugins/`.
    pub workspace: String,
    /// Directories between the kind directory and the file, dot-joined.
    pub category: String,
    pub stem: String,
}

/// Matches `plugins/*/<kind_dir>/**/*.py` and returns the files sorted by
/// full path.
///
/// Two files of the same kind sharing a stem, even in different workspaces
/// or categories, fail with [`DomainError::DuplicateDefinition`].
pub fn discover(
    paths: &[RelativePath],
    kind: DefinitionKind,
) -> Result<Vec<DiscoveredFile>, DomainError> {
    let mut found: Vec<DiscoveredFile> = paths
        .iter()
        .filter_map(|path| classify(path, kind))
        .collect();
    found.sort_by(|a, b| a.path.cmp(&b.path));

    let mut seen = HashSet::new();
    for file in &found {
        if !seen.insert(file.stem.as_str()) {
            return Err(DomainError::DuplicateDefinition {
                kind,
                name: file.stem.clone(),
            });
        }
    }
    Ok(found)
}

fn classify(path: &RelativePath, kind: DefinitionKind) -> Option<DiscoveredFile> {
    let segments = path.segments();
    // plugins / <workspace> / <kind_dir> / [category..] / <file>.py
    if segments.len() < 4 || segments[0] != PLUGINS_DIR || segments[2] != kind.dir_name() {
        return None;
    }
    let file_name = segments.last()?;
    if file_name == PACKAGE_MARKER || !file_name.ends_with(".py") {
        return None;
    }
    let stem = path.stem()?;
    Some(DiscoveredFile {
        path: path.clone(),
        kind,
        workspace: segments[1].clone(),
        category: segments[3..segments.len() - 1].join("."),
        stem,
    })
}
