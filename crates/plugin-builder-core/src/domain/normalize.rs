//! Field type and value normalization.
//!
//! Each [`FieldType`] has two spellings: the runtime configuration name
//! used in documents and the Python annotation used in generated
//! constructors. Values are normalized the same way: JSON-compatible data
//! for documents, Python source text for scaffolding.

use std::io;

use serde::Serialize;
use serde_json::{Map, Value, ser::Formatter};

use crate::domain::entities::{FieldFormat, FieldType, Fsm, RecordDefinition};
use crate::source::Literal;

/// Type name in configuration documents.
pub fn config_type(field_type: &FieldType) -> String {
    match field_type {
        FieldType::String => "string".into(),
        FieldType::Integer => "integer".into(),
        FieldType::Number => "number".into(),
        FieldType::Boolean => "boolean".into(),
        FieldType::DateTime => "DateTime".into(),
        FieldType::Object => "object".into(),
        FieldType::Array => "array".into(),
        FieldType::Dynamic => "MU".into(),
        FieldType::RecordRef(target) => format!("<AxisAtom.{target}>"),
        FieldType::ArrayOfRecordRef(target) => format!("array<AxisAtom.{target}>"),
        FieldType::ArrayOfDynamic => "array<MU>".into(),
    }
}

/// Python annotation, wrapped in `typing.Optional` when nullable.
pub fn python_type(field_type: &FieldType, nullable: bool) -> String {
    let base = match field_type {
        FieldType::String => "str".to_string(),
        FieldType::Integer => "int".into(),
        FieldType::Number => "float".into(),
        FieldType::Boolean => "bool".into(),
        FieldType::DateTime => "datetime.datetime".into(),
        FieldType::Object => "dict".into(),
        FieldType::Array | FieldType::ArrayOfDynamic => "typing.List[typing.Any]".into(),
        FieldType::Dynamic => "typing.Any".into(),
        FieldType::RecordRef(target) => target.clone(),
        FieldType::ArrayOfRecordRef(target) => format!("typing.List[{target}]"),
    };
    if nullable {
        format!("typing.Optional[{base}]")
    } else {
        base
    }
}

// ── JSON text ────────────────────────────────────────────────────────────────

/// Serializes like Python's `json.dumps` with default options:
/// `", "` and `": "` separators, every non-ASCII character escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonJsonFormatter;

impl Formatter for PythonJsonFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() && c != '\x7f' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// JSON text of `value` in Python's default `json.dumps` layout.
pub fn python_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PythonJsonFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ── Field values ─────────────────────────────────────────────────────────────

/// `format` as stored in documents: mappings become JSON text.
pub fn format_text(format: &FieldFormat) -> Result<String, serde_json::Error> {
    match format {
        FieldFormat::Mapping(mapping) => python_json(mapping),
        FieldFormat::Text(text) => Ok(text.clone()),
    }
}

/// `field_fsm` document: trigger → transition with absent options omitted.
pub fn fsm_value(fsm: &[(String, Fsm)]) -> Value {
    let mut triggers = Map::new();
    for (trigger, transition) in fsm {
        let mut entry = Map::new();
        entry.insert(
            "execution_method".into(),
            Value::String(transition.execution_method.clone()),
        );
        let optional = [
            ("success_transition", &transition.success_transition),
            ("failure_transition", &transition.failure_transition),
            ("status_value", &transition.status_value),
            ("status_type", &transition.status_type),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                entry.insert(key.into(), Value::String(value.clone()));
            }
        }
        if let Some(pre) = &transition.pre_statuses {
            entry.insert(
                "pre_statuses".into(),
                Value::Array(pre.iter().cloned().map(Value::String).collect()),
            );
        }
        triggers.insert(trigger.clone(), Value::Object(entry));
    }
    Value::Object(triggers)
}

/// Default value as stored in documents. References keep their dotted text.
pub fn document_default(default: &Literal) -> Result<Value, serde_json::Error> {
    match default {
        Literal::Name(path) => Ok(Value::String(path.clone())),
        other => other.to_json(),
    }
}

/// Default value as Python source for generated constructors.
pub fn python_default(default: &Literal) -> Result<String, serde_json::Error> {
    match default {
        Literal::Str(s) => python_json(s),
        other => Ok(other.to_python()),
    }
}

// ── Constructor parameters ──────────────────────────────────────────────────

/// One constructor parameter of a generated record class.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub python_type: String,
    /// Rendered default, `None` for required parameters.
    pub default: Option<String>,
    pub is_identifier: bool,
}

/// Parameters for a record's own fields, in declaration order:
/// identifier, local fields, reference fields.
///
/// A field with a default, or a nullable field, gets a default (`None`
/// when it declares none). The identifier is never nullable; reference
/// fields always are.
pub fn own_parameters(record: &RecordDefinition) -> Result<Vec<Parameter>, serde_json::Error> {
    let mut params = Vec::new();
    if let Some(identifier) = &record.identifier {
        params.push(Parameter {
            name: identifier.name.clone(),
            python_type: python_type(&identifier.field_type, false),
            default: identifier.default.as_ref().map(python_default).transpose()?,
            is_identifier: true,
        });
    }
    for field in &record.local_fields {
        let default = field.default.as_ref().map(python_default).transpose()?;
        let default = match default {
            None if field.nullable => Some("None".to_string()),
            other => other,
        };
        params.push(Parameter {
            name: field.name.clone(),
            python_type: python_type(&field.field_type, field.nullable),
            default,
            is_identifier: false,
        });
    }
    for field in &record.ref_fields {
        params.push(Parameter {
            name: field.name.clone(),
            python_type: python_type(&field.field_type, true),
            default: Some("None".into()),
            is_identifier: false,
        });
    }
    Ok(params)
}

/// Moves identifiers to the front, then splits into required and
/// defaulted parameters. Both passes are stable.
pub fn split_parameters(params: Vec<Parameter>) -> (Vec<Parameter>, Vec<Parameter>) {
    let (identifiers, others): (Vec<_>, Vec<_>) =
        params.into_iter().partition(|p| p.is_identifier);
    identifiers
        .into_iter()
        .chain(others)
        .partition(|p| p.default.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::RelativePath;
    use crate::domain::entities::{
        DefinitionKind, DefinitionUnit, Identifier, LocalField, RefField,
    };

    fn local(name: &str, nullable: bool, default: Option<Literal>) -> LocalField {
        LocalField {
            name: name.into(),
            field_type: FieldType::String,
            persistence: true,
            nullable,
            immutable: false,
            unique: false,
            default,
            enumeration: None,
            format: None,
            metadata: None,
            alias: None,
            fsm: None,
            dbtype: None,
            length: None,
        }
    }

    fn record(local_fields: Vec<LocalField>) -> RecordDefinition {
        RecordDefinition {
            unit: DefinitionUnit {
                name: "User".into(),
                workspace: "default".into(),
                category: "default".into(),
                version: 1,
                update: None,
                kind: DefinitionKind::Record,
                path: RelativePath::new("plugins/default/classes/default/User.py"),
            },
            identifier: Some(Identifier {
                name: "id".into(),
                field_type: FieldType::String,
                persistence: true,
                immutable: true,
                default: None,
                metadata: None,
                dbtype: None,
                length: None,
            }),
            local_fields,
            ref_fields: vec![RefField {
                name: "owner".into(),
                field_type: FieldType::RecordRef("Account".into()),
                ref_class: "Account".into(),
                ref_class_field: "id".into(),
                persistence: true,
                unique: false,
                metadata: None,
                dbtype: None,
                length: None,
            }],
            extends: Vec::new(),
            persistence: true,
            is_abstract: false,
            api_generation: false,
            api_auto_response: None,
            scope: None,
            created_at: None,
            class_methods: Vec::new(),
            instance_methods: Vec::new(),
        }
    }

    #[test]
    fn config_and_python_spellings() {
        let reference = FieldType::ArrayOfRecordRef("User".into());
        assert_eq!(config_type(&reference), "array<AxisAtom.User>");
        assert_eq!(python_type(&reference, false), "typing.List[User]");
        assert_eq!(config_type(&FieldType::Dynamic), "MU");
        assert_eq!(
            python_type(&FieldType::DateTime, true),
            "typing.Optional[datetime.datetime]"
        );
        assert_eq!(config_type(&FieldType::ArrayOfDynamic), "array<MU>");
    }

    #[test]
    fn json_text_uses_python_separators_and_ascii() {
        let mapping = Literal::Dict(vec![
            (Literal::Str("b".into()), Literal::Int(1)),
            (
                Literal::Str("a".into()),
                Literal::List(vec![Literal::Str("é".into()), Literal::None]),
            ),
        ]);
        assert_eq!(
            format_text(&FieldFormat::Mapping(mapping)).unwrap(),
            r#"{"b": 1, "a": ["\u00e9", null]}"#
        );
        assert_eq!(
            format_text(&FieldFormat::Text("email".into())).unwrap(),
            "email"
        );
    }

    #[test]
    fn astral_characters_use_surrogate_pairs() {
        assert_eq!(python_json("😀").unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn fsm_omits_absent_transitions() {
        let fsm = vec![(
            "activate".to_string(),
            Fsm {
                execution_method: "run".into(),
                success_transition: Some("active".into()),
                pre_statuses: Some(vec!["new".into()]),
                ..Fsm::default()
            },
        )];
        let value = fsm_value(&fsm);
        let entry = &value["activate"];
        assert_eq!(entry["execution_method"], "run");
        assert_eq!(entry["success_transition"], "active");
        assert_eq!(entry["pre_statuses"][0], "new");
        assert!(entry.get("failure_transition").is_none());
    }

    #[test]
    fn defaults_render_per_target() {
        assert_eq!(python_default(&Literal::Str("a\"b".into())).unwrap(), r#""a\"b""#);
        assert_eq!(python_default(&Literal::Bool(true)).unwrap(), "True");
        assert_eq!(python_default(&Literal::Name("comp.NOW".into())).unwrap(), "comp.NOW");
        assert_eq!(
            document_default(&Literal::Name("comp.NOW".into())).unwrap(),
            Value::String("comp.NOW".into())
        );
        assert_eq!(document_default(&Literal::Int(3)).unwrap(), Value::from(3));
    }

    #[test]
    fn required_parameters_precede_defaulted_ones() {
        let record = record(vec![
            local("name", false, None),
            local("note", true, None),
            local("kind", false, None),
            local("label", false, Some(Literal::Str("x".into()))),
        ]);
        let (required, defaulted) = split_parameters(own_parameters(&record).unwrap());
        let required: Vec<_> = required.iter().map(|p| p.name.as_str()).collect();
        let defaulted: Vec<_> = defaulted
            .iter()
            .map(|p| (p.name.as_str(), p.default.as_deref().unwrap()))
            .collect();
        assert_eq!(required, vec!["id", "name", "kind"]);
        assert_eq!(
            defaulted,
            vec![("note", "None"), ("label", "\"x\""), ("owner", "None")]
        );
    }

    #[test]
    fn identifiers_move_to_front() {
        let p = |name: &str, is_identifier: bool| Parameter {
            name: name.into(),
            python_type: "str".into(),
            default: None,
            is_identifier,
        };
        let (required, _) = split_parameters(vec![p("a", false), p("id", true), p("b", false)]);
        let names: Vec<_> = required.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "a", "b"]);
    }
}
