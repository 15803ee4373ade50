//! Configuration documents, one per definition.
//!
//! Documents are built as [`serde_json::Value`] trees; encoding them to
//! text is the job of a [`crate::application::ports::DocumentEncoder`].
//! Optional attributes that are absent are left out entirely, so the only
//! `null` a document can carry is a global variable's `initial`.

use serde_json::{Map, Value, json};

use crate::domain::normalize::{config_type, document_default, format_text, fsm_value};
use crate::domain::{
    Command, DaemonDefinition, DefinitionUnit, DomainError, GlobalVariable, Hooks, Identifier,
    LocalField, ModuleDefinition, RecordDefinition, RefField, ScenarioDefinition, Script,
    Transaction,
};

fn invalid(unit: &DefinitionUnit, err: serde_json::Error) -> DomainError {
    DomainError::setting(unit.path.to_string(), err.to_string())
}

fn insert_some<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

/// `category`, `name`, `version` and `update` shared by every document.
fn header(unit: &DefinitionUnit) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("category".into(), unit.category.clone().into());
    doc.insert("name".into(), unit.name.clone().into());
    doc.insert("version".into(), unit.version.into());
    insert_some(&mut doc, "update", unit.update.clone());
    doc
}

fn global_variables(variables: &[GlobalVariable]) -> Value {
    let map: Map<String, Value> = variables
        .iter()
        .map(|v| {
            (
                v.name.clone(),
                json!({"description": v.description, "initial": v.initial}),
            )
        })
        .collect();
    Value::Object(map)
}

// ── Records ─────────────────────────────────────────────────────────────────

pub fn record_document(record: &RecordDefinition) -> Result<Value, DomainError> {
    let unit = &record.unit;
    let mut doc = header(unit);
    doc.insert("persistence".into(), record.persistence.into());
    doc.insert("abstract".into(), record.is_abstract.into());
    if !record.extends.is_empty() {
        doc.insert("extends".into(), record.extends.clone().into());
    }
    doc.insert("api_generation".into(), record.api_generation.into());
    insert_some(&mut doc, "api_auto_response", record.api_auto_response);
    insert_some(&mut doc, "scope", record.scope.clone());
    insert_some(&mut doc, "created_at", record.created_at.clone());

    let mut attributes = Map::new();
    if let Some(identifier) = &record.identifier {
        attributes.insert(
            "identifier".into(),
            identifier_value(identifier).map_err(|e| invalid(unit, e))?,
        );
    }
    if !record.local_fields.is_empty() {
        let fields = record
            .local_fields
            .iter()
            .map(local_field_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid(unit, e))?;
        attributes.insert("local_fields".into(), Value::Array(fields));
    }
    if !record.ref_fields.is_empty() {
        let fields = record.ref_fields.iter().map(ref_field_value).collect();
        attributes.insert("ref_fields".into(), Value::Array(fields));
    }
    doc.insert("attributes".into(), Value::Object(attributes));

    let mut methods = Map::new();
    if !record.class_methods.is_empty() {
        let class_methods = record
            .class_methods
            .iter()
            .map(|m| json!({"method_body": m.body}))
            .collect();
        methods.insert("class_methods".into(), Value::Array(class_methods));
    }
    if !record.instance_methods.is_empty() {
        let instance_methods = record
            .instance_methods
            .iter()
            .map(|m| {
                let mut method = Map::new();
                method.insert("method_body".into(), m.body.clone().into());
                method.insert("propagation_mode".into(), m.meta.propagation_mode.into());
                method.insert("topdown".into(), m.meta.topdown.into());
                method.insert("auto_rollback".into(), m.meta.auto_rollback.into());
                method.insert(
                    "multiplexable_number".into(),
                    m.meta.multiplexable_number.into(),
                );
                method.insert("field_order".into(), m.meta.field_order.clone().into());
                insert_some(&mut method, "timeout", m.meta.timeout);
                Value::Object(method)
            })
            .collect();
        methods.insert("instance_methods".into(), Value::Array(instance_methods));
    }
    doc.insert("methods".into(), Value::Object(methods));

    Ok(Value::Object(doc))
}

fn identifier_value(identifier: &Identifier) -> Result<Value, serde_json::Error> {
    let mut field = Map::new();
    field.insert("field_name".into(), identifier.name.clone().into());
    field.insert("field_type".into(), config_type(&identifier.field_type).into());
    field.insert("field_persistence".into(), identifier.persistence.into());
    field.insert("field_immutable".into(), identifier.immutable.into());
    insert_some(
        &mut field,
        "field_default",
        identifier.default.as_ref().map(document_default).transpose()?,
    );
    insert_some(&mut field, "field_metadata", identifier.metadata.clone());
    insert_some(&mut field, "field_dbtype", identifier.dbtype.clone());
    insert_some(&mut field, "field_length", identifier.length);
    Ok(Value::Object(field))
}

fn local_field_value(local: &LocalField) -> Result<Value, serde_json::Error> {
    let mut field = Map::new();
    field.insert("field_name".into(), local.name.clone().into());
    field.insert("field_type".into(), config_type(&local.field_type).into());
    field.insert("field_persistence".into(), local.persistence.into());
    field.insert("field_nullable".into(), local.nullable.into());
    field.insert("field_immutable".into(), local.immutable.into());
    field.insert("field_unique".into(), local.unique.into());
    insert_some(
        &mut field,
        "field_default",
        local.default.as_ref().map(document_default).transpose()?,
    );
    insert_some(&mut field, "field_enum", local.enumeration.clone());
    insert_some(
        &mut field,
        "field_format",
        local.format.as_ref().map(format_text).transpose()?,
    );
    insert_some(&mut field, "field_metadata", local.metadata.clone());
    insert_some(&mut field, "field_alias", local.alias.clone());
    insert_some(&mut field, "field_fsm", local.fsm.as_deref().map(fsm_value));
    insert_some(&mut field, "field_dbtype", local.dbtype.clone());
    insert_some(&mut field, "field_length", local.length);
    Ok(Value::Object(field))
}

fn ref_field_value(reference: &RefField) -> Value {
    let mut field = Map::new();
    field.insert("field_name".into(), reference.name.clone().into());
    field.insert("field_type".into(), config_type(&reference.field_type).into());
    field.insert("field_persistence".into(), reference.persistence.into());
    field.insert("field_unique".into(), reference.unique.into());
    field.insert("ref_class".into(), reference.ref_class.clone().into());
    field.insert("ref_class_field".into(), reference.ref_class_field.clone().into());
    insert_some(&mut field, "field_metadata", reference.metadata.clone());
    insert_some(&mut field, "field_dbtype", reference.dbtype.clone());
    insert_some(&mut field, "field_length", reference.length);
    Value::Object(field)
}

// ── Scenarios ───────────────────────────────────────────────────────────────

pub fn scenario_document(scenario: &ScenarioDefinition) -> Value {
    let mut doc = header(&scenario.unit);
    doc.insert("uri".into(), scenario.uri.clone().into());
    doc.insert("method".into(), scenario.method.as_str().into());
    doc.insert(
        "additional_paths".into(),
        scenario.additional_paths.clone().into(),
    );
    doc.insert("request_timeout".into(), scenario.request_timeout.into());
    doc.insert("connect_timeout".into(), scenario.connect_timeout.into());
    doc.insert(
        "routing_auto_generation_mode".into(),
        scenario.routing_auto_generation_mode.into(),
    );
    doc.insert("routing_options".into(), json!({"scope": scenario.scope}));
    doc.insert(
        "global_variables".into(),
        global_variables(&scenario.global_variables),
    );
    doc.insert("transaction".into(), transaction_value(&scenario.transaction));
    doc.insert(
        "commands".into(),
        Value::Array(scenario.commands.iter().map(command_value).collect()),
    );
    doc.insert("variable_groups".into(), json!([]));
    doc.insert(
        "spec".into(),
        json!({"response": {"normal": {"codes": [200]}}}),
    );
    Value::Object(doc)
}

/// A disabled transaction keeps only `enable`, `xname` and `async`.
fn transaction_value(tx: &Transaction) -> Value {
    let mut doc = Map::new();
    doc.insert("enable".into(), tx.enable.into());
    doc.insert("xname".into(), tx.xname.clone().into());
    doc.insert("async".into(), true.into());
    if !tx.enable {
        return Value::Object(doc);
    }
    doc.insert("xname_use_counter".into(), tx.xname_use_counter.into());
    doc.insert("xdomain".into(), tx.xdomain.clone().into());
    doc.insert("xtype".into(), tx.xtype.clone().into());
    doc.insert("auto_rollback".into(), tx.auto_rollback.into());
    doc.insert("auto_begin".into(), tx.auto_begin.into());
    doc.insert("auto_response".into(), tx.auto_response.into());
    if !tx.lock_keys.is_empty() {
        doc.insert(
            "lock".into(),
            json!({
                "lock_keys": tx.lock_keys,
                "retry_count": tx.retry_count,
                "retry_interval": tx.retry_interval,
            }),
        );
    }
    insert_some(&mut doc, "timeout", tx.timeout);
    Value::Object(doc)
}

fn aspect_options(hooks: &Hooks, kwargs: &mut Map<String, Value>) {
    if hooks.is_empty() {
        return;
    }
    let mut options = Map::new();
    if let Some(code) = &hooks.pre_process {
        options.insert("pre".into(), json!({"process": code}));
    }
    if let Some(code) = &hooks.post_process {
        options.insert("post".into(), json!({"process": code}));
    }
    kwargs.insert("aspect_options".into(), Value::Object(options));
}

fn command_entry(name: &str, label: Option<&str>, kwargs: Option<Map<String, Value>>) -> Value {
    let mut command = Map::new();
    command.insert("command".into(), name.into());
    insert_some(&mut command, "label", label);
    insert_some(&mut command, "kwargs", kwargs.map(Value::Object));
    Value::Object(command)
}

fn script_kwargs(script: &Script) -> Map<String, Value> {
    let mut kwargs = Map::new();
    aspect_options(&script.hooks, &mut kwargs);
    kwargs.insert("code".into(), script.code.clone().into());
    kwargs
}

fn command_value(command: &Command) -> Value {
    let label = command.label();
    match command {
        Command::RequestValidation(validation) => {
            let mut kwargs = Map::new();
            aspect_options(&validation.hooks, &mut kwargs);
            insert_some(&mut kwargs, "body", validation.body.clone());
            insert_some(&mut kwargs, "resources", validation.resources.clone());
            insert_some(&mut kwargs, "params", validation.params.clone());
            insert_some(&mut kwargs, "headers", validation.headers.clone());
            command_entry("request_validation", label, Some(kwargs))
        }
        Command::Script(script) => {
            let mut kwargs = script_kwargs(script);
            let mut cancellation = Map::new();
            cancellation.insert("cancellable".into(), script.cancellable.into());
            if let Some(code) = &script.cancel_code {
                cancellation.insert(
                    "actions".into(),
                    json!([{"action_type": "script", "code": code}]),
                );
            }
            kwargs.insert("cancellation".into(), Value::Object(cancellation));
            command_entry("script", label, Some(kwargs))
        }
        Command::Custom { id, .. } => {
            let mut kwargs = Map::new();
            insert_some(&mut kwargs, "id", id.clone());
            command_entry("custom", label, Some(kwargs))
        }
        Command::Breakpoint { .. } => command_entry("breakpoint", label, None),
        Command::Serve { .. } => command_entry("serve", label, None),
        Command::Sleep { seconds, .. } => {
            let mut kwargs = Map::new();
            kwargs.insert("seconds".into(), seconds.clone());
            command_entry("sleep", label, Some(kwargs))
        }
    }
}

// ── Daemons and modules ─────────────────────────────────────────────────────

pub fn daemon_document(daemon: &DaemonDefinition) -> Value {
    let mut doc = header(&daemon.unit);
    doc.insert("status".into(), daemon.status.as_str().into());
    doc.insert(
        "action".into(),
        json!({
            "unlimited": daemon.unlimited,
            "count": daemon.count,
            "interval": daemon.interval,
        }),
    );
    doc.insert(
        "global_variables".into(),
        global_variables(&daemon.global_variables),
    );
    let commands = daemon
        .commands
        .iter()
        .map(|script| command_entry("script", script.label.as_deref(), Some(script_kwargs(script))))
        .collect();
    doc.insert("commands".into(), Value::Array(commands));
    doc.insert("variable_groups".into(), json!([]));
    Value::Object(doc)
}

pub fn module_document(module: &ModuleDefinition) -> Value {
    let mut doc = header(&module.unit);
    doc.insert("code".into(), module.code.clone().into());
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{field, identifier, record, unit};
    use crate::domain::{
        DaemonStatus, DefinitionKind, FieldFormat, Fsm, HttpMethod, InstanceMethod,
        InstanceMethodMeta, RequestValidation,
    };
    use crate::source::Literal;

    #[test]
    fn record_document_omits_absent_options() {
        let mut user = record("User", &[], vec![field("name", false)]);
        user.identifier = Some(identifier("id"));
        let doc = record_document(&user).unwrap();

        assert_eq!(doc["name"], "User");
        assert_eq!(doc["persistence"], true);
        assert!(doc.get("extends").is_none());
        assert!(doc.get("scope").is_none());
        assert!(doc.get("update").is_none());
        assert_eq!(doc["attributes"]["identifier"]["field_type"], "string");
        assert!(doc["attributes"]["identifier"].get("field_default").is_none());
        assert_eq!(doc["attributes"]["local_fields"][0]["field_nullable"], false);
        assert!(doc["attributes"].get("ref_fields").is_none());
        assert_eq!(doc["methods"], json!({}));
    }

    #[test]
    fn empty_record_still_has_attributes_and_methods() {
        let doc = record_document(&record("Empty", &["Base"], Vec::new())).unwrap();
        assert_eq!(doc["attributes"], json!({}));
        assert_eq!(doc["methods"], json!({}));
        assert_eq!(doc["extends"], json!(["Base"]));
    }

    #[test]
    fn field_values_are_normalized() {
        let mut status = field("status", true);
        status.default = Some(Literal::Name("options.DEFAULT".into()));
        status.format = Some(FieldFormat::Mapping(Literal::Dict(vec![(
            Literal::Str("k".into()),
            Literal::Int(1),
        )])));
        status.fsm = Some(vec![(
            "finish".into(),
            Fsm {
                execution_method: "close".into(),
                ..Fsm::default()
            },
        )]);
        let mut user = record("User", &[], vec![status]);
        user.instance_methods.push(InstanceMethod {
            name: "run".into(),
            body: "def run(self):\n    pass\n".into(),
            meta: InstanceMethodMeta::default(),
        });

        let doc = record_document(&user).unwrap();
        let field = &doc["attributes"]["local_fields"][0];
        assert_eq!(field["field_default"], "options.DEFAULT");
        assert_eq!(field["field_format"], "{\"k\": 1}");
        assert_eq!(field["field_fsm"], json!({"finish": {"execution_method": "close"}}));

        let method = &doc["methods"]["instance_methods"][0];
        assert_eq!(method["field_order"], "ascend");
        assert_eq!(method["multiplexable_number"], 1);
        assert!(method.get("timeout").is_none());
    }

    fn scenario(commands: Vec<Command>, transaction: Transaction) -> ScenarioDefinition {
        ScenarioDefinition {
            unit: unit(DefinitionKind::Scenario, "CreateUser"),
            method: HttpMethod::Post,
            uri: "/v1/users".into(),
            additional_paths: Vec::new(),
            scope: "local".into(),
            request_timeout: 60,
            connect_timeout: 60,
            routing_auto_generation_mode: true,
            transaction,
            global_variables: vec![GlobalVariable {
                name: "req".into(),
                description: String::new(),
                initial: Value::Null,
            }],
            commands,
        }
    }

    #[test]
    fn scenario_document_shape() {
        let commands = vec![
            Command::RequestValidation(RequestValidation {
                body: Some(json!({"type": "object"})),
                hooks: Hooks {
                    pre_process: None,
                    post_process: Some("x = 1\n".into()),
                },
                ..RequestValidation::default()
            }),
            Command::Script(Script {
                label: Some("Response".into()),
                code: "pass\n".into(),
                cancellable: true,
                cancel_code: Some("# Cancel\npass\n".into()),
                hooks: Hooks::default(),
            }),
            Command::Custom {
                label: None,
                id: Some("ext".into()),
            },
        ];
        let doc = scenario_document(&scenario(commands, Transaction::default()));

        assert_eq!(doc["method"], "POST");
        assert_eq!(doc["routing_options"], json!({"scope": "local"}));
        assert_eq!(doc["global_variables"]["req"], json!({"description": "", "initial": null}));
        assert_eq!(doc["spec"]["response"]["normal"]["codes"], json!([200]));
        assert_eq!(
            doc["transaction"],
            json!({"enable": false, "xname": "", "async": true})
        );

        let validation = &doc["commands"][0];
        assert_eq!(validation["command"], "request_validation");
        assert!(validation.get("label").is_none());
        assert_eq!(validation["kwargs"]["aspect_options"], json!({"post": {"process": "x = 1\n"}}));
        assert_eq!(validation["kwargs"]["body"], json!({"type": "object"}));

        let script = &doc["commands"][1];
        assert_eq!(script["label"], "Response");
        assert_eq!(
            script["kwargs"]["cancellation"],
            json!({"cancellable": true, "actions": [{"action_type": "script", "code": "# Cancel\npass\n"}]})
        );
        assert!(script["kwargs"].get("aspect_options").is_none());

        assert_eq!(doc["commands"][2], json!({"command": "custom", "kwargs": {"id": "ext"}}));
    }

    #[test]
    fn enabled_transaction_carries_lock_only_with_keys() {
        let tx = Transaction {
            enable: true,
            ..Transaction::default()
        };
        let doc = scenario_document(&scenario(Vec::new(), tx.clone()));
        assert_eq!(doc["transaction"]["auto_begin"], true);
        assert!(doc["transaction"].get("lock").is_none());

        let locked = Transaction {
            lock_keys: vec!["k".into()],
            ..tx
        };
        let doc = scenario_document(&scenario(Vec::new(), locked));
        assert_eq!(
            doc["transaction"]["lock"],
            json!({"lock_keys": ["k"], "retry_count": 0, "retry_interval": 0})
        );
        assert_eq!(doc["transaction"]["async"], true);
    }

    #[test]
    fn daemon_and_module_documents() {
        let daemon = DaemonDefinition {
            unit: unit(DefinitionKind::Daemon, "Log"),
            unlimited: true,
            count: -1,
            interval: 60,
            status: DaemonStatus::Inactive,
            global_variables: Vec::new(),
            commands: vec![Script {
                label: None,
                code: "pass\n".into(),
                cancellable: false,
                cancel_code: None,
                hooks: Hooks::default(),
            }],
        };
        let doc = daemon_document(&daemon);
        assert_eq!(doc["status"], "inactive");
        assert_eq!(doc["action"], json!({"unlimited": true, "count": -1, "interval": 60}));
        assert_eq!(doc["commands"], json!([{"command": "script", "kwargs": {"code": "pass\n"}}]));

        let module = ModuleDefinition {
            unit: unit(DefinitionKind::Module, "constants"),
            code: "A = 1\n".into(),
        };
        assert_eq!(
            module_document(&module),
            json!({"category": "default", "name": "constants", "version": 1, "code": "A = 1\n"})
        );
    }
}
