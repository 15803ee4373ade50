//! Python scaffolding written to the generated `libs/` package.
//!
//! The scaffolding lets definition files import each other and gives
//! editors something to resolve: `atom.py` re-exports every record class,
//! `module.py` every module, `classes.py` holds one aggregation class per
//! record with a typed constructor, and `model.py` one table per record.

use tracing::debug;

use super::render::RenderContext;
use crate::domain::normalize::{Parameter, own_parameters, split_parameters};
use crate::domain::{
    DomainError, ModuleDefinition, OutputTree, RecordDefinition, RecordGraph, RelativePath,
};

pub const BANNER: &str = "\
##########################
# Automatically generated
##########################

";

const SCENARIO_CONTEXT: &str = "\
from {{SDK_PACKAGE}}.sdk_libs.scenario_context import (
    axis,
    qmonus,
    session,
    resources,
    params,
    request,
)
from .module import *
";

const MODULE_IMPORTS: &str = "from .module import *\n";

const GLOBALS: &str = "\
from {{SDK_PACKAGE}}.sdk_libs.{{KIND}}_globals import *
from . import {{KIND}}_context as context, atom, model
";

const MODEL_HEADER: &str = "\
from {{SDK_PACKAGE}}.sdk_libs.model import aiodb

import sqlalchemy

metadata = sqlalchemy.MetaData()


";

const CLASSES_HEADER: &str = "\
from __future__ import annotations
import typing
from {{SDK_PACKAGE}}.class_libs import component as comp
from {{PLUGIN_ROOT}}.{{LIBS_PACKAGE}}.class_globals import *


";

/// Columns every generated table carries after the record's own fields.
const BASE_COLUMNS: [&str; 3] = ["instance", "xid", "xname"];

/// Where the scaffolding lives and which SDK package it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOptions {
    /// Python package name of the plugin root.
    pub plugin_root: String,
    /// Generated package directory, relative to the plugin root.
    pub libs_dir: String,
    pub sdk_package: String,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        Self {
            plugin_root: "sdk_plugins".into(),
            libs_dir: "libs".into(),
            sdk_package: "plugin_sdk".into(),
        }
    }
}

impl ScaffoldOptions {
    fn libs_segments(&self) -> Vec<&str> {
        self.libs_dir
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect()
    }

    /// Relative import prefix from the libs package back to the plugin root.
    pub fn parent_prefix(&self) -> String {
        ".".repeat(self.libs_segments().len() + 1)
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext::new()
            .with_variable("PLUGIN_ROOT", self.plugin_root.clone())
            .with_variable("LIBS_DIR", self.libs_dir.clone())
            .with_variable("LIBS_PACKAGE", self.libs_segments().join("."))
            .with_variable("SDK_PACKAGE", self.sdk_package.clone())
    }
}

/// Builds every file of the libs package, paths relative to it.
pub fn scaffold(
    graph: &RecordGraph<'_>,
    modules: &[ModuleDefinition],
    options: &ScaffoldOptions,
) -> Result<OutputTree, DomainError> {
    let ctx = options.render_context();
    let prefix = options.parent_prefix();
    let mut tree = OutputTree::new();
    let mut add = |name: &str, body: String| {
        tree.add_file(RelativePath::new(name), format!("{BANNER}{body}"));
    };

    add("__init__.py", String::new());

    let module_imports: String = modules
        .iter()
        .map(|module| {
            let parent = module
                .unit
                .path
                .as_path()
                .parent()
                .map(|p| RelativePath::new(p).segments().join("."))
                .unwrap_or_default();
            format!("from {prefix}{parent} import {}\n", module.unit.name)
        })
        .collect();
    add("module.py", module_imports);

    let atom_imports: String = graph
        .ordered()
        .iter()
        .map(|record| {
            format!(
                "from {prefix}{} import {}\n",
                record.unit.module_path(),
                record.name()
            )
        })
        .collect();
    add("atom.py", atom_imports);

    let mut model = ctx.render(MODEL_HEADER);
    let mut classes = ctx.render(CLASSES_HEADER);
    for record in graph.ordered() {
        let (required, defaulted) = constructor_parameters(graph, record)?;
        model.push_str(&table(record, required.iter().chain(&defaulted)));
        classes.push_str(&class_source(record, &required, &defaulted));
    }
    add("model.py", model);
    add("classes.py", classes);

    add("scenario_context.py", ctx.render(SCENARIO_CONTEXT));
    for kind in ["daemon", "class", "module"] {
        add(&format!("{kind}_context.py"), MODULE_IMPORTS.to_string());
    }
    for kind in ["scenario", "daemon", "class", "module"] {
        let globals = ctx.clone().with_variable("KIND", kind).render(GLOBALS);
        add(&format!("{kind}_globals.py"), globals);
    }

    tree.validate()?;
    debug!(
        files = tree.len(),
        records = graph.ordered().len(),
        modules = modules.len(),
        "scaffolding built"
    );
    Ok(tree)
}

/// Inherited fields first, in ancestor order, then the record's own;
/// split into required and defaulted parameters.
pub fn constructor_parameters(
    graph: &RecordGraph<'_>,
    record: &RecordDefinition,
) -> Result<(Vec<Parameter>, Vec<Parameter>), DomainError> {
    let mut params = Vec::new();
    for owner in graph.ancestors(record).into_iter().chain([record]) {
        params.extend(
            own_parameters(owner)
                .map_err(|e| DomainError::setting(owner.unit.path.to_string(), e.to_string()))?,
        );
    }
    Ok(split_parameters(params))
}

fn table<'p>(record: &RecordDefinition, params: impl Iterator<Item = &'p Parameter>) -> String {
    let name = record.name();
    let mut lines = vec![
        format!("{name} = sqlalchemy.Table("),
        format!("    \"{name}\", metadata,"),
    ];
    let columns = params
        .map(|p| p.name.as_str())
        .chain(BASE_COLUMNS)
        .map(|column| format!("    sqlalchemy.Column(\"{column}\"),"));
    lines.extend(columns);
    lines.push(")".into());
    format!("{}\n\n\n", lines.join("\n"))
}

fn class_source(record: &RecordDefinition, required: &[Parameter], defaulted: &[Parameter]) -> String {
    let name = record.name();
    let mut lines = vec![format!("class {name}(")];
    if record.extends.is_empty() {
        lines.push("    comp.BaseClass,".into());
    } else {
        lines.extend(record.extends.iter().map(|p| format!("    atom.{p},")));
    }
    lines.push("):".into());

    lines.push("    def __init__(".into());
    lines.push("        self,".into());
    for p in required {
        lines.push(format!("        {}: {},", p.name, p.python_type));
    }
    for p in defaulted {
        let default = p.default.as_deref().unwrap_or("None");
        lines.push(format!("        {}: {} = {default},", p.name, p.python_type));
    }
    lines.push("    ):".into());
    lines.push("        # Automatically Generated".into());
    lines.push(String::new());
    for p in required.iter().chain(defaulted) {
        lines.push(format!("        self.{0}: {1} = {0}", p.name, p.python_type));
    }
    lines.push("        pass".into());

    if !required.is_empty() || !defaulted.is_empty() {
        lines.extend(
            [
                "",
                "    @classmethod",
                "    async def load(",
                "        cls,",
                "        key,",
                "        conn=None,",
                "        shallow=False",
            ]
            .map(String::from),
        );
        lines.push(format!("    ) -> atom.{name}:"));
        lines.extend(
            [
                "        raise NotImplementedError",
                "",
                "    @classmethod",
                "    async def retrieve(",
                "        cls,",
                "        conn=None,",
                "        shallow=False,",
                "        order_by=[],",
                "        offset=0,",
                "        limit=None,",
                "        *,",
                "        instance=None,",
                "        xid=None,",
                "        xname=None,",
            ]
            .map(String::from),
        );
        for p in required.iter().chain(defaulted) {
            lines.push(format!("        {}=None,", p.name));
        }
        lines.push(format!("    ) -> typing.List[atom.{name}]:"));
        lines.push("        raise NotImplementedError".into());
    }
    format!("{}\n\n\n", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{field, identifier, record, unit};
    use crate::domain::{DefinitionKind, RefField, FieldType};

    fn records() -> Vec<RecordDefinition> {
        let mut user = record("User", &["Person"], vec![field("name", false), field("note", true)]);
        user.identifier = Some(identifier("id"));
        user.ref_fields.push(RefField {
            name: "account".into(),
            field_type: FieldType::RecordRef("Account".into()),
            ref_class: "Account".into(),
            ref_class_field: "id".into(),
            persistence: true,
            unique: false,
            metadata: None,
            dbtype: None,
            length: None,
        });
        let person = record("Person", &[], vec![field("nickname", true), field("age", false)]);
        vec![user, person, record("Account", &[], Vec::new())]
    }

    fn constants() -> ModuleDefinition {
        ModuleDefinition {
            unit: unit(DefinitionKind::Module, "constants"),
            code: String::new(),
        }
    }

    #[test]
    fn constructor_lists_inherited_fields_first() {
        let records = records();
        let graph = RecordGraph::resolve(&records).unwrap();
        let user = graph.get("User").unwrap();
        let (required, defaulted) = constructor_parameters(&graph, user).unwrap();

        let names = |params: &[Parameter]| params.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&required), vec!["id", "age", "name"]);
        assert_eq!(names(&defaulted), vec!["nickname", "note", "account"]);
        assert_eq!(defaulted[2].python_type, "typing.Optional[Account]");
    }

    #[test]
    fn imports_climb_out_of_the_libs_package() {
        let records = records();
        let graph = RecordGraph::resolve(&records).unwrap();
        let tree = scaffold(&graph, &[constants()], &ScaffoldOptions::default()).unwrap();

        let atom = tree.get("atom.py").unwrap();
        assert!(atom.starts_with(BANNER));
        assert!(atom.contains("from ..plugins.default.classes.default.Person import Person\n"));
        assert_eq!(
            tree.get("module.py").unwrap(),
            format!("{BANNER}from ..plugins.default.modules.default import constants\n")
        );

        let nested = ScaffoldOptions {
            libs_dir: "gen/libs".into(),
            ..ScaffoldOptions::default()
        };
        assert_eq!(nested.parent_prefix(), "...");
        let tree = scaffold(&graph, &[], &nested).unwrap();
        assert!(tree.get("classes.py").unwrap().contains("from sdk_plugins.gen.libs.class_globals import *"));
    }

    #[test]
    fn every_library_file_is_generated() {
        let tree = scaffold(&RecordGraph::resolve(&[]).unwrap(), &[], &ScaffoldOptions::default())
            .unwrap();
        assert_eq!(tree.len(), 13);
        assert_eq!(tree.get("__init__.py"), Some(BANNER));
        assert_eq!(
            tree.get("daemon_globals.py").unwrap(),
            format!(
                "{BANNER}from plugin_sdk.sdk_libs.daemon_globals import *\nfrom . import daemon_context as context, atom, model\n"
            )
        );
        assert!(tree
            .get("scenario_context.py")
            .unwrap()
            .contains("from plugin_sdk.sdk_libs.scenario_context import (\n    axis,"));
        assert_eq!(
            tree.get("class_context.py").unwrap(),
            format!("{BANNER}from .module import *\n")
        );
    }

    #[test]
    fn model_has_a_column_per_parameter_plus_base_columns() {
        let records = records();
        let graph = RecordGraph::resolve(&records).unwrap();
        let tree = scaffold(&graph, &[], &ScaffoldOptions::default()).unwrap();
        let model = tree.get("model.py").unwrap();
        assert!(model.contains("metadata = sqlalchemy.MetaData()\n"));
        assert!(model.contains(
            "Account = sqlalchemy.Table(\n    \"Account\", metadata,\n    sqlalchemy.Column(\"instance\"),\n    sqlalchemy.Column(\"xid\"),\n    sqlalchemy.Column(\"xname\"),\n)\n"
        ));
        assert!(model.contains("    \"Person\", metadata,\n    sqlalchemy.Column(\"age\"),\n    sqlalchemy.Column(\"nickname\"),\n"));
    }

    #[test]
    fn classes_render_bases_constructor_and_stubs() {
        let records = records();
        let graph = RecordGraph::resolve(&records).unwrap();
        let tree = scaffold(&graph, &[], &ScaffoldOptions::default()).unwrap();
        let classes = tree.get("classes.py").unwrap();

        assert!(classes.contains("class Account(\n    comp.BaseClass,\n):\n"));
        assert!(classes.contains("class User(\n    atom.Person,\n):\n"));
        assert!(classes.contains("        id: str,\n        age: str,\n        name: str,\n"));
        assert!(classes.contains("        note: typing.Optional[str] = None,\n"));
        assert!(classes.contains("        self.id: str = id\n"));
        assert!(classes.contains("    ) -> typing.List[atom.User]:\n"));

        let account = classes
            .split("class Account(")
            .nth(1)
            .and_then(|rest| rest.split("\nclass ").next())
            .unwrap();
        assert!(!account.contains("async def load"));
    }
}
