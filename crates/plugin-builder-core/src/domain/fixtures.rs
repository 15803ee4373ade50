//! Record builders shared by unit tests.

use crate::domain::common::RelativePath;
use crate::domain::entities::{
    DefinitionKind, DefinitionUnit, FieldType, Identifier, LocalField, RecordDefinition,
};

pub(crate) fn unit(kind: DefinitionKind, name: &str) -> DefinitionUnit {
    DefinitionUnit {
        name: name.into(),
        workspace: "default".into(),
        category: "default".into(),
        version: 1,
        update: None,
        kind,
        path: RelativePath::new(format!(
            "plugins/default/{}/default/{name}.py",
            kind.dir_name()
        )),
    }
}

pub(crate) fn identifier(name: &str) -> Identifier {
    Identifier {
        name: name.into(),
        field_type: FieldType::String,
        persistence: true,
        immutable: true,
        default: None,
        metadata: None,
        dbtype: None,
        length: None,
    }
}

pub(crate) fn field(name: &str, nullable: bool) -> LocalField {
    LocalField {
        name: name.into(),
        field_type: FieldType::String,
        persistence: true,
        nullable,
        immutable: false,
        unique: false,
        default: None,
        enumeration: None,
        format: None,
        metadata: None,
        alias: None,
        fsm: None,
        dbtype: None,
        length: None,
    }
}

pub(crate) fn record(name: &str, extends: &[&str], fields: Vec<LocalField>) -> RecordDefinition {
    RecordDefinition {
        unit: unit(DefinitionKind::Record, name),
        identifier: None,
        local_fields: fields,
        ref_fields: Vec::new(),
        extends: extends.iter().map(|e| (*e).to_string()).collect(),
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
