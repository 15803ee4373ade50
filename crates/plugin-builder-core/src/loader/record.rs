//! Record classes.
//!
//! A record file `User.py` defines `class User(classes.User)` whose
//! `__setting__` returns the field layout. Methods decorated with
//! `@classmethod` or `@comp.instance_method(...)` are carried verbatim;
//! undecorated helpers are ignored.

use tracing::debug;

use super::setting::{Arguments, class_name, expect_call, field_type};
use super::{entity, expect_setting, file_label, outline, setting_literal};
use crate::domain::{
    ClassMethod, DefinitionKind, DiscoveredFile, DomainError, FieldFormat, Fsm, Identifier,
    InstanceMethod, InstanceMethodMeta, LocalField, RecordDefinition, RefField,
};
use crate::source::literal::last_segment;
use crate::source::{Literal, SourceOutline, Statement, StatementKind, method_source};

const SETTING_PARAMS: &[&str] = &[
    "identifier",
    "local_fields",
    "ref_fields",
    "persistence",
    "abstract",
    "extends",
    "api_generation",
    "api_auto_response",
    "scope",
    "workspace",
    "category",
    "version",
    "created_at",
    "update",
];

const IDENTIFIER_PARAMS: &[&str] = &[
    "name",
    "type",
    "persistence",
    "immutable",
    "default",
    "metadata",
    "dbtype",
    "length",
];

const LOCAL_FIELD_PARAMS: &[&str] = &[
    "name",
    "type",
    "persistence",
    "nullable",
    "immutable",
    "unique",
    "default",
    "enum",
    "format",
    "metadata",
    "alias",
    "fsm",
    "dbtype",
    "length",
];

const REF_FIELD_PARAMS: &[&str] = &[
    "name",
    "type",
    "ref_class",
    "ref_class_field",
    "persistence",
    "unique",
    "metadata",
    "dbtype",
    "length",
];

const FSM_PARAMS: &[&str] = &[
    "execution_method",
    "success_transition",
    "failure_transition",
    "status_value",
    "status_type",
    "pre_statuses",
];

const INSTANCE_METHOD_PARAMS: &[&str] = &[
    "propagation_mode",
    "topdown",
    "auto_rollback",
    "multiplexable_number",
    "field_order",
    "timeout",
];

/// Generated aggregation module every record class must derive from.
const AGGREGATION_MODULE: &str = "classes";

pub fn load_record(file: &DiscoveredFile, text: &str) -> Result<RecordDefinition, DomainError> {
    let label = file_label(file);
    let outline = outline(file, text)?;
    let class = entity(&outline, &file.stem, file)?;
    check_base(&outline, class, file)?;

    let literal = setting_literal(&outline, class, file)?;
    let call = expect_setting(&literal, "Setting", file)?;
    let args = Arguments::bind(call, SETTING_PARAMS, &label)?;
    let unit = super::definition_unit(&args, file.stem.clone(), file, DefinitionKind::Record)?;

    let identifier = args
        .call("identifier", "Identifier")?
        .map(|call| identifier(&Arguments::bind(call, IDENTIFIER_PARAMS, &label)?, &label))
        .transpose()?;
    let local_fields = args
        .sequence("local_fields")?
        .iter()
        .map(|item| {
            let call = expect_call(item, "LocalField", &label)?;
            local_field(&Arguments::bind(call, LOCAL_FIELD_PARAMS, &label)?, &label)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let ref_fields = args
        .sequence("ref_fields")?
        .iter()
        .map(|item| {
            let call = expect_call(item, "RefField", &label)?;
            ref_field(&Arguments::bind(call, REF_FIELD_PARAMS, &label)?, &label)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut class_methods = Vec::new();
    let mut instance_methods = Vec::new();
    for method in class.methods() {
        match method_kind(&outline, method, &label)? {
            Some(MethodKind::Class) => class_methods.push(ClassMethod {
                name: method.name().unwrap_or_default().to_string(),
                body: method_body(&outline, method),
            }),
            Some(MethodKind::Instance(meta)) => instance_methods.push(InstanceMethod {
                name: method.name().unwrap_or_default().to_string(),
                body: method_body(&outline, method),
                meta,
            }),
            None => {}
        }
    }

    debug!(
        record = %unit.name,
        local_fields = local_fields.len(),
        ref_fields = ref_fields.len(),
        "record loaded"
    );
    Ok(RecordDefinition {
        identifier,
        local_fields,
        ref_fields,
        extends: args.class_names("extends")?,
        persistence: args.bool_or("persistence", true)?,
        is_abstract: args.bool_or("abstract", false)?,
        api_generation: args.bool_or("api_generation", false)?,
        api_auto_response: args.bool("api_auto_response")?,
        scope: args.string("scope")?,
        created_at: args.string("created_at")?,
        class_methods,
        instance_methods,
        unit,
    })
}

/// The only accepted base is `classes.<Stem>`.
fn check_base(
    outline: &SourceOutline<'_>,
    class: &Statement,
    file: &DiscoveredFile,
) -> Result<(), DomainError> {
    let expected = format!("{AGGREGATION_MODULE}.{}", file.stem);
    let bases = outline
        .bases(class)
        .map_err(|e| DomainError::extraction(file_label(file), e))?;
    match bases.as_slice() {
        [Literal::Name(path)] if *path == expected => Ok(()),
        _ => Err(DomainError::InvalidParent {
            record: file.stem.clone(),
            parent: expected,
        }),
    }
}

fn identifier(args: &Arguments<'_>, label: &str) -> Result<Identifier, DomainError> {
    Ok(Identifier {
        name: args.required_string("name")?,
        field_type: field_type(args.required("type")?, label)?,
        persistence: args.bool_or("persistence", true)?,
        immutable: args.bool_or("immutable", true)?,
        default: args.literal("default").cloned(),
        metadata: args.json("metadata")?,
        dbtype: args.string("dbtype")?,
        length: args.int("length")?,
    })
}

fn local_field(args: &Arguments<'_>, label: &str) -> Result<LocalField, DomainError> {
    let format = match args.literal("format") {
        None => None,
        Some(Literal::Str(text)) => Some(FieldFormat::Text(text.clone())),
        Some(mapping @ Literal::Dict(_)) => Some(FieldFormat::Mapping(mapping.clone())),
        Some(other) => {
            return Err(DomainError::setting(
                label,
                format!(
                    "'LocalField' argument 'format' must be a dict or a string, got {}",
                    other.type_name()
                ),
            ));
        }
    };
    let fsm = match args.literal("fsm") {
        None => None,
        Some(Literal::Dict(entries)) => Some(
            entries
                .iter()
                .map(|(trigger, transition)| fsm_entry(trigger, transition, label))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(other) => {
            return Err(DomainError::setting(
                label,
                format!(
                    "'LocalField' argument 'fsm' must be a dict, got {}",
                    other.type_name()
                ),
            ));
        }
    };

    Ok(LocalField {
        name: args.required_string("name")?,
        field_type: field_type(args.required("type")?, label)?,
        persistence: args.bool_or("persistence", true)?,
        nullable: args.bool_or("nullable", true)?,
        immutable: args.bool_or("immutable", false)?,
        unique: args.bool_or("unique", false)?,
        default: args.literal("default").cloned(),
        enumeration: args.json("enum")?,
        format,
        metadata: args.json("metadata")?,
        alias: args.string("alias")?,
        fsm,
        dbtype: args.string("dbtype")?,
        length: args.int("length")?,
    })
}

fn fsm_entry(trigger: &Literal, transition: &Literal, label: &str) -> Result<(String, Fsm), DomainError> {
    let trigger = trigger
        .as_str()
        .ok_or_else(|| DomainError::setting(label, "fsm trigger names must be strings"))?;
    let call = expect_call(transition, "FSM", label)?;
    let args = Arguments::bind(call, FSM_PARAMS, label)?;
    let pre_statuses = match args.literal("pre_statuses") {
        Some(_) => Some(args.string_list("pre_statuses")?),
        None => None,
    };
    Ok((
        trigger.to_string(),
        Fsm {
            execution_method: args.required_string("execution_method")?,
            success_transition: args.string("success_transition")?,
            failure_transition: args.string("failure_transition")?,
            status_value: args.string("status_value")?,
            status_type: args.string("status_type")?,
            pre_statuses,
        },
    ))
}

fn ref_field(args: &Arguments<'_>, label: &str) -> Result<RefField, DomainError> {
    let ref_class = args.required("ref_class")?;
    Ok(RefField {
        name: args.required_string("name")?,
        field_type: field_type(args.required("type")?, label)?,
        ref_class: class_name(ref_class).ok_or_else(|| {
            DomainError::setting(
                label,
                format!(
                    "'RefField' argument 'ref_class' must be a class, got {}",
                    ref_class.type_name()
                ),
            )
        })?,
        ref_class_field: args.required_string("ref_class_field")?,
        persistence: args.bool_or("persistence", true)?,
        unique: args.bool_or("unique", false)?,
        metadata: args.json("metadata")?,
        dbtype: args.string("dbtype")?,
        length: args.int("length")?,
    })
}

enum MethodKind {
    Class,
    Instance(InstanceMethodMeta),
}

/// Classifies a method by its decorators.
fn method_kind(
    outline: &SourceOutline<'_>,
    method: &Statement,
    label: &str,
) -> Result<Option<MethodKind>, DomainError> {
    for decorator in &method.decorators {
        let path = outline.decorator_path(decorator);
        if path == "classmethod" {
            return Ok(Some(MethodKind::Class));
        }
        if last_segment(&path) != "instance_method" {
            continue;
        }
        let literal = outline
            .literal(decorator.tokens.clone())
            .map_err(|e| DomainError::setting(label, e.to_string()))?;
        let call = literal.as_call().ok_or_else(|| {
            DomainError::setting(
                label,
                format!(
                    "'{path}' must be called, e.g. '@{path}()' on '{}'",
                    method.name().unwrap_or_default()
                ),
            )
        })?;
        let args = Arguments::bind(call, INSTANCE_METHOD_PARAMS, label)?;
        let defaults = InstanceMethodMeta::default();
        return Ok(Some(MethodKind::Instance(InstanceMethodMeta {
            propagation_mode: args.bool_or("propagation_mode", defaults.propagation_mode)?,
            topdown: args.bool_or("topdown", defaults.topdown)?,
            auto_rollback: args.bool_or("auto_rollback", defaults.auto_rollback)?,
            multiplexable_number: args
                .int_or("multiplexable_number", defaults.multiplexable_number)?,
            field_order: args.string_or("field_order", &defaults.field_order)?,
            timeout: args.int("timeout")?,
        })));
    }
    Ok(None)
}

fn method_body(outline: &SourceOutline<'_>, method: &Statement) -> String {
    let is_async = matches!(method.kind, StatementKind::Def { is_async: true, .. });
    method_source(&outline.statement_text(method), is_async)
}
