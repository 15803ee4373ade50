//! Command classes of scenarios and daemons.
//!
//! Commands are top-level classes named `Command0`, `Command1`, ... that
//! derive from one of the command base classes. The numeric suffix is the
//! execution order and must be contiguous from zero.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::setting::{Arguments, class_name, to_json};
use super::{
    expect_setting, file_label, hook_body, required_hook_body, schema, setting_literal,
};
use crate::domain::{
    Command, DefinitionKind, DiscoveredFile, DomainError, Hooks, RequestValidation, Script,
};
use crate::source::{SourceOutline, Statement};

static COMMAND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Command(\d+)$").unwrap());

/// A command class found in the file, with its base class name.
#[derive(Debug, Clone)]
pub(crate) struct CommandClass<'o> {
    pub statement: &'o Statement,
    pub base: String,
}

/// Finds the command classes and orders them by number.
///
/// `accepted` lists the base classes allowed for `kind`; a numbered class
/// deriving from anything else is [`DomainError::UnsupportedCommand`].
pub(crate) fn command_classes<'o>(
    outline: &'o SourceOutline<'_>,
    file: &DiscoveredFile,
    kind: DefinitionKind,
    accepted: &[&str],
) -> Result<Vec<CommandClass<'o>>, DomainError> {
    let mut numbered: Vec<(u64, CommandClass<'o>)> = Vec::new();

    for statement in outline.classes() {
        let name = statement.name().unwrap_or_default();
        let base = first_base(outline, statement);
        let is_command_base = Command::BASES.contains(&base.as_str());
        let number = COMMAND_NAME
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().parse::<u64>());

        match (is_command_base, number) {
            (true, Some(Ok(n))) if accepted.contains(&base.as_str()) => {
                numbered.push((n, CommandClass { statement, base }));
            }
            (_, Some(Ok(_))) => {
                return Err(DomainError::UnsupportedCommand {
                    name: name.to_string(),
                    base,
                    kind,
                    file: file.stem.clone(),
                });
            }
            (true, _) => {
                return Err(DomainError::InvalidCommandName {
                    name: name.to_string(),
                    expected: format!("Command{}", numbered.len()),
                    file: file.stem.clone(),
                });
            }
            (false, _) => {}
        }
    }

    numbered.sort_by_key(|(n, _)| *n);
    for (index, (_, class)) in numbered.iter().enumerate() {
        let expected = format!("Command{index}");
        let name = class.statement.name().unwrap_or_default();
        if name != expected {
            return Err(DomainError::InvalidCommandName {
                name: name.to_string(),
                expected,
                file: file.stem.clone(),
            });
        }
    }
    debug!(file = %file.path, count = numbered.len(), "command classes found");
    Ok(numbered.into_iter().map(|(_, class)| class).collect())
}

/// Last segment of the first base class, empty when there is none.
fn first_base(outline: &SourceOutline<'_>, class: &Statement) -> String {
    outline
        .bases(class)
        .ok()
        .and_then(|bases| bases.first().and_then(class_name))
        .unwrap_or_default()
}

fn hooks(
    outline: &SourceOutline<'_>,
    class: &Statement,
    file: &DiscoveredFile,
) -> Result<Hooks, DomainError> {
    Ok(Hooks {
        pre_process: hook_body(outline, class, "pre_process", file)?,
        post_process: hook_body(outline, class, "post_process", file)?,
    })
}

/// Reads one scenario command.
pub(crate) fn scenario_command(
    outline: &SourceOutline<'_>,
    class: CommandClass<'_>,
    file: &DiscoveredFile,
) -> Result<Command, DomainError> {
    let label = file_label(file);
    let statement = class.statement;
    let literal = setting_literal(outline, statement, file)?;

    let command = match class.base.as_str() {
        "RequestValidation" => {
            let call = expect_setting(&literal, "RequestValidationSetting", file)?;
            let args = Arguments::bind(call, &["label"], &label)?;
            Command::RequestValidation(RequestValidation {
                label: args.string("label")?,
                body: schema(outline, statement, "body", file)?,
                resources: schema(outline, statement, "resources", file)?,
                params: schema(outline, statement, "params", file)?,
                headers: schema(outline, statement, "headers", file)?,
                hooks: hooks(outline, statement, file)?,
            })
        }
        "Script" => {
            let call = expect_setting(&literal, "ScriptSetting", file)?;
            let args = Arguments::bind(call, &["label", "cancellable"], &label)?;
            Command::Script(Script {
                label: args.string("label")?,
                code: required_hook_body(outline, statement, "code", file)?,
                cancellable: args.bool_or("cancellable", true)?,
                cancel_code: hook_body(outline, statement, "cancel_code", file)?,
                hooks: hooks(outline, statement, file)?,
            })
        }
        "Custom" => {
            let call = expect_setting(&literal, "CustomSetting", file)?;
            let args = Arguments::bind(call, &["label", "id_in_kwargs"], &label)?;
            Command::Custom {
                label: args.string("label")?,
                id: args.string("id_in_kwargs")?,
            }
        }
        "Breakpoint" => {
            let call = expect_setting(&literal, "BreakpointSetting", file)?;
            let args = Arguments::bind(call, &["label"], &label)?;
            Command::Breakpoint {
                label: args.string("label")?,
            }
        }
        "Serve" => {
            let call = expect_setting(&literal, "ServeSetting", file)?;
            let args = Arguments::bind(call, &["label"], &label)?;
            Command::Serve {
                label: args.string("label")?,
            }
        }
        "Sleep" => {
            let call = expect_setting(&literal, "SleepSetting", file)?;
            let args = Arguments::bind(call, &["label", "seconds"], &label)?;
            Command::Sleep {
                label: args.string("label")?,
                seconds: to_json(args.required("seconds")?, &label)?,
            }
        }
        other => {
            return Err(DomainError::UnsupportedCommand {
                name: statement.name().unwrap_or_default().to_string(),
                base: other.to_string(),
                kind: DefinitionKind::Scenario,
                file: file.stem.clone(),
            });
        }
    };
    Ok(command)
}

/// Reads one daemon command: a script without cancellation.
pub(crate) fn daemon_script(
    outline: &SourceOutline<'_>,
    class: CommandClass<'_>,
    file: &DiscoveredFile,
) -> Result<Script, DomainError> {
    let label = file_label(file);
    let statement = class.statement;
    let literal = setting_literal(outline, statement, file)?;
    let call = expect_setting(&literal, "ScriptSetting", file)?;
    let args = Arguments::bind(call, &["label"], &label)?;
    Ok(Script {
        label: args.string("label")?,
        code: required_hook_body(outline, statement, "code", file)?,
        cancellable: false,
        cancel_code: None,
        hooks: hooks(outline, statement, file)?,
    })
}
