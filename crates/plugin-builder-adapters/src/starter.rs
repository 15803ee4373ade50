//! Starter project for `plugin-builder init`.
//!
//! [`starter_kit`] is the single entry point. It picks where the starter
//! files come from so callers do not need to know:
//!
//! 1. **`$PLUGIN_BUILDER_STARTER_DIR`**: a directory whose files are copied
//!    verbatim (after placeholder rendering). Useful for teams that ship
//!    their own conventions.
//! 2. The starter embedded in the binary ([`BuiltinStarterKit`]): one record
//!    `User`, one scenario `CreateUser`, one daemon `Log`, one module
//!    `constants` and a placeholder libs package.
//!
//! File paths and contents may use `{{PLUGIN_ROOT}}`, `{{LIBS_DIR}}`,
//! `{{LIBS_PACKAGE}}` and `{{SDK_PACKAGE}}`.

use std::path::{Path, PathBuf};

use plugin_builder_core::{
    application::{ApplicationError, ports::StarterKit},
    domain::{OutputTree, RelativePath},
    error::{BuilderError, BuilderResult, Context},
};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

pub const STARTER_DIR_ENV: &str = "PLUGIN_BUILDER_STARTER_DIR";

// ── Embedded starter ──────────────────────────────────────────────────────────

const BUILTIN_FILES: &[(&str, &str)] = &[
    (
        "plugins/default/classes/default/User.py",
        include_str!("../starter/plugins/default/classes/default/User.py"),
    ),
    (
        "plugins/default/scenarios/default/CreateUser.py",
        include_str!("../starter/plugins/default/scenarios/default/CreateUser.py"),
    ),
    (
        "plugins/default/daemons/default/Log.py",
        include_str!("../starter/plugins/default/daemons/default/Log.py"),
    ),
    (
        "plugins/default/modules/default/constants.py",
        include_str!("../starter/plugins/default/modules/default/constants.py"),
    ),
    (
        "{{LIBS_DIR}}/__init__.py",
        include_str!("../starter/libs/__init__.py"),
    ),
    (
        "{{LIBS_DIR}}/classes.py",
        include_str!("../starter/libs/classes.py"),
    ),
    (
        "{{LIBS_DIR}}/model.py",
        include_str!("../starter/libs/model.py"),
    ),
];

/// The starter project compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinStarterKit;

impl StarterKit for BuiltinStarterKit {
    fn files(&self) -> BuilderResult<OutputTree> {
        Ok(BUILTIN_FILES
            .iter()
            .fold(OutputTree::new(), |tree, (path, content)| {
                tree.with_file(RelativePath::new(*path), *content)
            }))
    }
}

// ── Directory starter ─────────────────────────────────────────────────────────

/// Every regular file below a directory, paths relative to it.
#[derive(Debug, Clone)]
pub struct DirectoryStarterKit {
    root: PathBuf,
}

impl DirectoryStarterKit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StarterKit for DirectoryStarterKit {
    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn files(&self) -> BuilderResult<OutputTree> {
        let mut tree = OutputTree::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| read_error(&self.root, e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .context("starter file outside its root")?;
            let content = std::fs::read_to_string(entry.path())
                .map_err(|e| read_error(entry.path(), e.to_string()))?;
            debug!(path = %relative.display(), "starter file");
            tree.add_file(RelativePath::try_new(relative)?, content);
        }
        if tree.is_empty() {
            warn!("starter directory contains no files");
        }
        Ok(tree)
    }
}

fn read_error(path: &Path, reason: String) -> BuilderError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason,
    }
    .into()
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// The directory kit named by `$PLUGIN_BUILDER_STARTER_DIR` when it exists,
/// otherwise the embedded one.
pub fn starter_kit() -> Box<dyn StarterKit> {
    match std::env::var_os(STARTER_DIR_ENV).map(PathBuf::from) {
        Some(dir) if dir.is_dir() => {
            info!(path = %dir.display(), "using starter directory");
            Box::new(DirectoryStarterKit::new(dir))
        }
        Some(dir) => {
            warn!(
                path = %dir.display(),
                "${STARTER_DIR_ENV} is not a directory, using the built-in starter"
            );
            Box::new(BuiltinStarterKit)
        }
        None => Box::new(BuiltinStarterKit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_builder_core::{
        domain::{Command, DefinitionKind, DiscoveredFile, discover},
        emit::ScaffoldOptions,
        loader,
    };
    use tempfile::TempDir;

    #[test]
    fn builtin_files_are_distinct_and_relative() {
        let tree = BuiltinStarterKit.files().unwrap();
        assert_eq!(tree.len(), BUILTIN_FILES.len());
        assert!(tree.validate().is_ok());
        assert!(
            tree.get("plugins/default/classes/default/User.py")
                .unwrap()
                .contains("class User(classes.User):")
        );
    }

    #[test]
    fn builtin_definitions_load() {
        let tree = BuiltinStarterKit.files().unwrap();
        let paths: Vec<RelativePath> = tree.files().map(|f| f.path.clone()).collect();
        let context = ScaffoldOptions::default().render_context();
        let text = |file: &DiscoveredFile| context.render(tree.get(&file.path.to_string()).unwrap());

        let records = discover(&paths, DefinitionKind::Record).unwrap();
        let user = loader::load_record(&records[0], &text(&records[0])).unwrap();
        assert_eq!(user.local_fields.len(), 3);
        assert_eq!(user.class_methods.len(), 1);
        assert_eq!(user.instance_methods.len(), 2);

        let scenarios = discover(&paths, DefinitionKind::Scenario).unwrap();
        let scenario = loader::load_scenario(&scenarios[0], &text(&scenarios[0])).unwrap();
        assert_eq!(scenario.commands.len(), 2);
        let Command::Script(script) = &scenario.commands[1] else {
            panic!("expected a script command");
        };
        assert!(script.cancel_code.as_deref().unwrap().starts_with("# Cancel\n"));

        let daemons = discover(&paths, DefinitionKind::Daemon).unwrap();
        assert!(loader::load_daemon(&daemons[0], &text(&daemons[0])).is_ok());

        let modules = discover(&paths, DefinitionKind::Module).unwrap();
        let module = loader::load_module(&modules[0], &text(&modules[0])).unwrap();
        assert!(module.code.contains("USER_TYPE_ADMIN = 'admin'"));
    }

    #[test]
    fn directory_kit_reads_nested_files() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("plugins/acme/modules/util");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("helpers.py"), "X = '{{SDK_PACKAGE}}'\n").unwrap();

        let tree = DirectoryStarterKit::new(dir.path()).files().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.get("plugins/acme/modules/util/helpers.py"),
            Some("X = '{{SDK_PACKAGE}}'\n")
        );
    }
}
