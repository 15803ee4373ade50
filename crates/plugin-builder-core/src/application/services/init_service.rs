//! Init Service - lays down a starter plugin tree in an existing project.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, StarterKit},
    },
    domain::RelativePath,
    emit::ScaffoldOptions,
    error::BuilderResult,
};

pub struct InitService {
    filesystem: Box<dyn Filesystem>,
    starter: Box<dyn StarterKit>,
    options: ScaffoldOptions,
}

impl InitService {
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        starter: Box<dyn StarterKit>,
        options: ScaffoldOptions,
    ) -> Self {
        Self {
            filesystem,
            starter,
            options,
        }
    }

    /// Writes the starter files below `<project>/<plugin_root>`.
    ///
    /// The project directory must exist. Existing files at the same paths
    /// are overwritten; anything else in the plugin root is left alone.
    /// Paths and contents are rendered with the scaffold placeholders.
    #[instrument(skip_all, fields(project = %project.display()))]
    pub fn init(&self, project: &Path) -> BuilderResult<Vec<PathBuf>> {
        if !self.filesystem.is_dir(project) {
            return Err(ApplicationError::ProjectNotFound {
                path: project.to_path_buf(),
            }
            .into());
        }

        let tree = self.starter.files()?;
        if tree.is_empty() {
            return Err(ApplicationError::ValidationFailed(
                "starter kit contains no files".into(),
            )
            .into());
        }
        tree.validate()?;

        let context = self.options.render_context();
        let root = project.join(&self.options.plugin_root);
        let mut written = Vec::with_capacity(tree.len());
        for file in tree.files() {
            let relative = RelativePath::try_new(context.render(&file.path.to_string()))?;
            let path = root.join(relative.as_path());
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem
                .write_file(&path, &context.render(&file.content))?;
            written.push(path);
        }

        info!(files = written.len(), root = %root.display(), "Starter files written");
        Ok(written)
    }
}
