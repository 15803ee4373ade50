//! Static loading of definition files.
//!
//! Every loader follows the same path: outline the file, find the primary
//! entity (the class named after the file for records, the `*Header`
//! class otherwise), evaluate the literal returned by its `__setting__`
//! method and bind it against the constructor's parameter list. Hook
//! bodies are sliced from the original text by [`crate::source::extract`].
//! No code from the project is executed.

pub mod command;
pub mod daemon;
pub mod module;
pub mod record;
pub mod scenario;
pub mod setting;

pub use daemon::load_daemon;
pub use module::load_module;
pub use record::load_record;
pub use scenario::load_scenario;

use serde_json::Value;

use crate::domain::{DefinitionKind, DefinitionUnit, DiscoveredFile, DomainError, GlobalVariable};
use crate::source::{Literal, SourceOutline, Statement, StatementKind, function_body};
use setting::{Arguments, expect_call, to_json};

const SETTING_HOOK: &str = "__setting__";

/// Source location used in error messages.
pub(crate) fn file_label(file: &DiscoveredFile) -> String {
    file.path.to_string()
}

pub(crate) fn outline<'s>(
    file: &DiscoveredFile,
    text: &'s str,
) -> Result<SourceOutline<'s>, DomainError> {
    SourceOutline::parse(text).map_err(|e| DomainError::extraction(file_label(file), e))
}

/// The top-level class `name`, or [`DomainError::MissingEntity`].
pub(crate) fn entity<'o>(
    outline: &'o SourceOutline<'_>,
    name: &str,
    file: &DiscoveredFile,
) -> Result<&'o Statement, DomainError> {
    outline
        .class(name)
        .ok_or_else(|| DomainError::MissingEntity {
            entity: name.to_string(),
            file: file_label(file),
        })
}

/// Evaluates the literal returned by `owner.__setting__()` and checks that
/// it is a call to `expected`.
pub(crate) fn setting_literal(
    outline: &SourceOutline<'_>,
    owner: &Statement,
    file: &DiscoveredFile,
) -> Result<Literal, DomainError> {
    let owner_name = owner.name().unwrap_or_default();
    let method = owner
        .method(SETTING_HOOK)
        .ok_or_else(|| DomainError::MissingHook {
            owner: owner_name.to_string(),
            hook: SETTING_HOOK.to_string(),
            file: file_label(file),
        })?;
    return_literal(outline, method, file)?.ok_or_else(|| {
        DomainError::setting(
            file_label(file),
            format!("'{owner_name}.{SETTING_HOOK}' must return a setting"),
        )
    })
}

/// The literal of the first `return` in `method`; `None` when there is no
/// return value or it is `None`.
pub(crate) fn return_literal(
    outline: &SourceOutline<'_>,
    method: &Statement,
    file: &DiscoveredFile,
) -> Result<Option<Literal>, DomainError> {
    let Some(StatementKind::Return { value: Some(range) }) = method.first_return().map(|r| &r.kind)
    else {
        return Ok(None);
    };
    let literal = outline
        .literal(range.clone())
        .map_err(|e| DomainError::setting(file_label(file), e.to_string()))?;
    Ok((!literal.is_none()).then_some(literal))
}

/// JSON value returned by an optional schema method such as `body()`.
pub(crate) fn schema(
    outline: &SourceOutline<'_>,
    owner: &Statement,
    hook: &str,
    file: &DiscoveredFile,
) -> Result<Option<Value>, DomainError> {
    let Some(method) = owner.method(hook) else {
        return Ok(None);
    };
    return_literal(outline, method, file)?
        .map(|literal| to_json(&literal, &file_label(file)))
        .transpose()
}

/// Verbatim body of an optional hook method.
pub(crate) fn hook_body(
    outline: &SourceOutline<'_>,
    owner: &Statement,
    hook: &str,
    file: &DiscoveredFile,
) -> Result<Option<String>, DomainError> {
    owner
        .method(hook)
        .map(|method| {
            function_body(&outline.statement_text(method))
                .map_err(|e| DomainError::extraction(file_label(file), e))
        })
        .transpose()
}

/// Verbatim body of a mandatory hook method.
pub(crate) fn required_hook_body(
    outline: &SourceOutline<'_>,
    owner: &Statement,
    hook: &str,
    file: &DiscoveredFile,
) -> Result<String, DomainError> {
    hook_body(outline, owner, hook, file)?.ok_or_else(|| DomainError::MissingHook {
        owner: owner.name().unwrap_or_default().to_string(),
        hook: hook.to_string(),
        file: file_label(file),
    })
}

/// Builds the shared metadata from the bound setting.
///
/// `workspace` and `category` default to the values derived from the
/// file's location; an explicitly empty workspace is rejected.
pub(crate) fn definition_unit(
    args: &Arguments<'_>,
    name: String,
    file: &DiscoveredFile,
    kind: DefinitionKind,
) -> Result<DefinitionUnit, DomainError> {
    let workspace = match args.string("workspace")? {
        Some(ws) if ws.is_empty() => {
            return Err(DomainError::EmptyWorkspace {
                file: file_label(file),
            });
        }
        Some(ws) => ws,
        None => file.workspace.clone(),
    };
    Ok(DefinitionUnit {
        name,
        workspace,
        category: args
            .string("category")?
            .unwrap_or_else(|| file.category.clone()),
        version: args.int_or("version", 1)?,
        update: args.string("update")?,
        kind,
        path: file.path.clone(),
    })
}

/// Module-level `name = comp.global_variable(...)` assignments in source
/// order. Assigning the same name again replaces the earlier entry in place.
pub(crate) fn global_variables(
    outline: &SourceOutline<'_>,
    file: &DiscoveredFile,
) -> Result<Vec<GlobalVariable>, DomainError> {
    let label = file_label(file);
    let mut variables: Vec<GlobalVariable> = Vec::new();
    for statement in &outline.statements {
        let StatementKind::Assign { target, value } = &statement.kind else {
            continue;
        };
        // Ordinary module code is not data; only declarations matter here.
        let Ok(literal) = outline.literal(value.clone()) else {
            continue;
        };
        let Some(call) = literal.as_call().filter(|c| {
            matches!(c.short_name(), "global_variable" | "GlobalVariable")
        }) else {
            continue;
        };
        let args = Arguments::bind(call, &["description", "initial"], &label)?;
        let variable = GlobalVariable {
            name: target.clone(),
            description: args.string_or("description", "")?,
            initial: args.json("initial")?.unwrap_or(Value::Null),
        };
        match variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => variables.push(variable),
        }
    }
    Ok(variables)
}

/// `expect_call` with the file label filled in.
pub(crate) fn expect_setting<'l>(
    literal: &'l Literal,
    expected: &str,
    file: &DiscoveredFile,
) -> Result<&'l crate::source::Call, DomainError> {
    expect_call(literal, expected, &file_label(file))
}


#[cfg(test)]
mod tests {
    use super::fixtures::discovered;
    use super::*;

    #[test]
    fn global_variables_replace_in_place() {
        let text = "\
req: dict = comp.global_variable()
other = compute(1) + 2
id = comp.global_variable('identifier', initial=[1, 'a'])
req = comp.global_variable(description='request')
";
        let file = discovered(DefinitionKind::Scenario, "CreateUser");
        let outline = outline(&file, text).unwrap();
        let vars = global_variables(&outline, &file).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "req");
        assert_eq!(vars[0].description, "request");
        assert_eq!(vars[0].initial, Value::Null);
        assert_eq!(vars[1].name, "id");
        assert_eq!(vars[1].initial, serde_json::json!([1, "a"]));
    }

    #[test]
    fn empty_workspace_is_a_configuration_error() {
        let text = "class ModuleHeader:\n    def __setting__(self):\n        return comp.Setting(workspace='')\n";
        let file = discovered(DefinitionKind::Module, "constants");
        let outline = outline(&file, text).unwrap();
        let header = entity(&outline, "ModuleHeader", &file).unwrap();
        let literal = setting_literal(&outline, header, &file).unwrap();
        let call = expect_setting(&literal, "Setting", &file).unwrap();
        let args = Arguments::bind(call, &["workspace", "category"], "m.py").unwrap();
        let err = definition_unit(&args, "constants".into(), &file, DefinitionKind::Module)
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyWorkspace { .. }));
    }

    #[test]
    fn missing_setting_hook_is_reported() {
        let text = "class ScenarioHeader:\n    pass\n";
        let file = discovered(DefinitionKind::Scenario, "S");
        let outline = outline(&file, text).unwrap();
        let header = entity(&outline, "ScenarioHeader", &file).unwrap();
        assert!(matches!(
            setting_literal(&outline, header, &file),
            Err(DomainError::MissingHook { hook, .. }) if hook == "__setting__"
        ));
        assert!(matches!(
            entity(&outline, "DaemonHeader", &file),
            Err(DomainError::MissingEntity { .. })
        ));
    }
}
