use tracing::debug;

use super::command::{command_classes, scenario_command};
use super::setting::Arguments;
use super::{entity, expect_setting, file_label, global_variables, outline, setting_literal};
use crate::domain::{
    Command, DefinitionKind, DiscoveredFile, DomainError, HttpMethod, ScenarioDefinition,
    Transaction,
};
use crate::source::Call;

const SETTING_PARAMS: &[&str] = &[
    "method",
    "uri",
    "transaction",
    "scope",
    "request_timeout",
    "connect_timeout",
    "routing_auto_generation_mode",
    "additional_paths",
    "workspace",
    "category",
    "name",
    "version",
    "update",
];

const TRANSACTION_PARAMS: &[&str] = &[
    "enable",
    "xdomain",
    "xtype",
    "xname",
    "xname_use_counter",
    "auto_rollback",
    "auto_begin",
    "auto_response",
    "lock_keys",
    "retry_count",
    "retry_interval",
    "timeout",
];

/// Loads a scenario from the `ScenarioHeader` class, the module-level
/// global variables and the numbered command classes.
pub fn load_scenario(file: &DiscoveredFile, text: &str) -> Result<ScenarioDefinition, DomainError> {
    let label = file_label(file);
    let outline = outline(file, text)?;
    let header = entity(&outline, "ScenarioHeader", file)?;
    let literal = setting_literal(&outline, header, file)?;
    let call = expect_setting(&literal, "Setting", file)?;
    let args = Arguments::bind(call, SETTING_PARAMS, &label)?;

    let name = args.string("name")?.unwrap_or_else(|| file.stem.clone());
    let unit = super::definition_unit(&args, name, file, DefinitionKind::Scenario)?;

    let method: HttpMethod = args
        .required_string("method")?
        .parse()
        .map_err(|reason: String| DomainError::setting(&label, reason))?;

    let transaction = match args.call("transaction", "Transaction")? {
        Some(call) => transaction(call, &label)?,
        None => Transaction::default(),
    };

    let commands = command_classes(&outline, file, DefinitionKind::Scenario, &Command::BASES)?
        .into_iter()
        .map(|class| scenario_command(&outline, class, file))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(scenario = %unit.name, commands = commands.len(), "scenario loaded");
    Ok(ScenarioDefinition {
        method,
        uri: args.required_string("uri")?,
        additional_paths: args.string_list("additional_paths")?,
        scope: args.string_or("scope", "local")?,
        request_timeout: args.int_or("request_timeout", 60)?,
        connect_timeout: args.int_or("connect_timeout", 60)?,
        routing_auto_generation_mode: args.bool_or("routing_auto_generation_mode", true)?,
        transaction,
        global_variables: global_variables(&outline, file)?,
        commands,
        unit,
    })
}

fn transaction(call: &Call, label: &str) -> Result<Transaction, DomainError> {
    let args = Arguments::bind(call, TRANSACTION_PARAMS, label)?;
    let defaults = Transaction::default();
    Ok(Transaction {
        enable: args.bool("enable")?.ok_or_else(|| {
            DomainError::setting(label, "'Transaction' requires argument 'enable'")
        })?,
        xdomain: args.string_or("xdomain", &defaults.xdomain)?,
        xtype: args.string_or("xtype", &defaults.xtype)?,
        xname: args.string_or("xname", &defaults.xname)?,
        xname_use_counter: args.bool_or("xname_use_counter", defaults.xname_use_counter)?,
        auto_rollback: args.bool_or("auto_rollback", defaults.auto_rollback)?,
        auto_begin: args.bool_or("auto_begin", defaults.auto_begin)?,
        auto_response: args.bool_or("auto_response", defaults.auto_response)?,
        lock_keys: args.string_list("lock_keys")?,
        retry_count: args.int_or("retry_count", defaults.retry_count)?,
        retry_interval: args.int_or("retry_interval", defaults.retry_interval)?,
        timeout: args.int("timeout")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures::discovered;

    const CREATE_USER: &str = r#"from __future__ import annotations
from plugin_sdk.scenario_libs import component as comp


class ScenarioHeader(comp.BaseHeader):
    def __setting__(self):
        return comp.Setting(
            method="POST",
            uri="/v1/users",
            transaction=comp.Transaction(
                enable=True,
                lock_keys=[
                    'lock_keys',
                ],
            ),
        )


req: dict = comp.global_variable()
id: str = comp.global_variable("user id")


class Command0(comp.RequestValidation):
    def __setting__(self):
        return comp.RequestValidationSetting()

    def body(self):
        """body schema"""
        return {
            "type": "object",
            "required": ["user"],
        }

    async def post_process(self):
        global req
        req = json.loads(context.session.request.body)['user']


class Command1(comp.Script):
    def __setting__(self):
        return comp.ScriptSetting(
            label='Response'
        )

    async def code(self):
        context.session.set_status(201)
        context.session.finish({"id": id})

    async def cancel_code(self):
        # Cancel
        pass
"#;

    fn load(text: &str) -> Result<ScenarioDefinition, DomainError> {
        load_scenario(&discovered(DefinitionKind::Scenario, "CreateUser"), text)
    }

    #[test]
    fn loads_header_globals_and_commands() {
        let scenario = load(CREATE_USER).unwrap();
        assert_eq!(scenario.unit.name, "CreateUser");
        assert_eq!(scenario.unit.workspace, "default");
        assert_eq!(scenario.method, HttpMethod::Post);
        assert_eq!(scenario.uri, "/v1/users");
        assert_eq!(scenario.scope, "local");
        assert_eq!(scenario.request_timeout, 60);
        assert!(scenario.transaction.enable);
        assert_eq!(scenario.transaction.lock_keys, vec!["lock_keys"]);
        assert!(scenario.transaction.auto_begin);

        let names: Vec<_> = scenario.global_variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["req", "id"]);
        assert_eq!(scenario.global_variables[1].description, "user id");

        assert_eq!(scenario.commands.len(), 2);
        let Command::RequestValidation(validation) = &scenario.commands[0] else {
            panic!("expected request validation first");
        };
        assert_eq!(validation.label, None);
        assert_eq!(
            validation.body,
            Some(serde_json::json!({"type": "object", "required": ["user"]}))
        );
        assert_eq!(
            validation.hooks.post_process.as_deref(),
            Some("global req\nreq = json.loads(context.session.request.body)['user']\n")
        );
        assert!(validation.hooks.pre_process.is_none());

        let Command::Script(script) = &scenario.commands[1] else {
            panic!("expected script second");
        };
        assert_eq!(script.label.as_deref(), Some("Response"));
        assert!(script.cancellable);
        assert_eq!(
            script.code,
            "context.session.set_status(201)\ncontext.session.finish({\"id\": id})\n"
        );
        assert_eq!(script.cancel_code.as_deref(), Some("# Cancel\npass\n"));
    }

    #[test]
    fn command_gap_is_rejected() {
        let text = CREATE_USER.replace("class Command1(", "class Command2(");
        let err = load(&text).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidCommandName {
                name: "Command2".into(),
                expected: "Command1".into(),
                file: "CreateUser".into(),
            }
        );
    }

    #[test]
    fn commands_follow_numeric_order_not_source_order() {
        let text = "\
class ScenarioHeader:
    def __setting__(self):
        return comp.Setting('GET', '/ping')


class Command1(comp.Serve):
    def __setting__(self):
        return comp.ServeSetting(label='serve')


class Command0(comp.Sleep):
    def __setting__(self):
        return comp.SleepSetting(seconds=2)
";
        let scenario = load(text).unwrap();
        assert!(matches!(scenario.commands[0], Command::Sleep { .. }));
        assert!(matches!(scenario.commands[1], Command::Serve { .. }));
        assert_eq!(scenario.transaction, Transaction::default());
    }

    #[test]
    fn script_without_code_is_a_missing_hook() {
        let text = CREATE_USER.replace("async def code(self):", "async def other(self):");
        assert!(matches!(
            load(&text),
            Err(DomainError::MissingHook { hook, .. }) if hook == "code"
        ));
    }

    #[test]
    fn numbered_class_with_unknown_base_is_unsupported() {
        let text = format!("{CREATE_USER}\n\nclass Command2(comp.Teleport):\n    pass\n");
        assert!(matches!(
            load(&text),
            Err(DomainError::UnsupportedCommand { base, .. }) if base == "Teleport"
        ));
    }

    #[test]
    fn invalid_method_is_a_setting_error() {
        let text = CREATE_USER.replace("method=\"POST\"", "method=\"FETCH\"");
        assert!(matches!(load(&text), Err(DomainError::InvalidSetting { .. })));
    }

    #[test]
    fn missing_header_is_a_reference_error() {
        assert!(matches!(
            load("class Other:\n    pass\n"),
            Err(DomainError::MissingEntity { entity, .. }) if entity == "ScenarioHeader"
        ));
    }

    #[test]
    fn local_command_base_class_is_rejected() {
        let text = CREATE_USER.replace(
            "class Command1(comp.Script):",
            "class Respond(comp.Script):\n    pass\n\n\nclass Command1(Respond):",
        );
        assert!(matches!(
            load(&text),
            Err(DomainError::InvalidCommandName { name, expected, .. })
                if name == "Respond" && expected == "Command1"
        ));
    }
}
