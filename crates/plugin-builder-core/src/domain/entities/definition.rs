use std::fmt;

use crate::domain::common::RelativePath;

/// The four kinds of definition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    Record,
    Scenario,
    Daemon,
    Module,
}

impl DefinitionKind {
    /// Emission order used by `dump`.
    pub const ALL: [DefinitionKind; 4] = [
        DefinitionKind::Record,
        DefinitionKind::Scenario,
        DefinitionKind::Module,
        DefinitionKind::Daemon,
    ];

    /// Directory below `plugins/<workspace>/` holding this kind, also used
    /// for the document output directory.
    pub const fn dir_name(self) -> &'static str {
        match self {
            DefinitionKind::Record => "classes",
            DefinitionKind::Scenario => "scenarios",
            DefinitionKind::Daemon => "daemons",
            DefinitionKind::Module => "modules",
        }
    }

    /// Reserved name of the metadata class; records use the file stem instead.
    pub const fn header_class(self) -> Option<&'static str> {
        match self {
            DefinitionKind::Record => None,
            DefinitionKind::Scenario => Some("ScenarioHeader"),
            DefinitionKind::Daemon => Some("DaemonHeader"),
            DefinitionKind::Module => Some("ModuleHeader"),
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefinitionKind::Record => "record",
            DefinitionKind::Scenario => "scenario",
            DefinitionKind::Daemon => "daemon",
            DefinitionKind::Module => "module",
        };
        write!(f, "{s}")
    }
}

/// Metadata shared by every definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionUnit {
    pub name: String,
    pub workspace: String,
    pub category: String,
    pub version: i64,
    pub update: Option<String>,
    pub kind: DefinitionKind,
    /// Source file, relative to the plugin root.
    pub path: RelativePath,
}

impl DefinitionUnit {
    /// Python module path of the source file relative to the plugin root,
    /// e.g. `plugins.default.classes.default.User`.
    pub fn module_path(&self) -> String {
        self.path
            .as_path()
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_directories() {
        assert_eq!(DefinitionKind::Record.dir_name(), "classes");
        assert_eq!(DefinitionKind::Daemon.header_class(), Some("DaemonHeader"));
        assert_eq!(DefinitionKind::Record.header_class(), None);
    }

    #[test]
    fn module_path_uses_dots() {
        let unit = DefinitionUnit {
            name: "User".into(),
            workspace: "default".into(),
            category: "default".into(),
            version: 1,
            update: None,
            kind: DefinitionKind::Record,
            path: RelativePath::new("plugins/default/classes/default/User.py"),
        };
        assert_eq!(unit.module_path(), "plugins.default.classes.default.User");
    }
}
