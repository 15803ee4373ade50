use serde_json::Value;

use super::DefinitionUnit;
use crate::source::Literal;

/// Field type of a record attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Object,
    Array,
    Dynamic,
    /// Reference to another record, by name
    RecordRef(String),
    ArrayOfRecordRef(String),
    ArrayOfDynamic,
}

/// Finite-state-machine transition attached to a field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fsm {
    pub execution_method: String,
    pub success_transition: Option<String>,
    pub failure_transition: Option<String>,
    pub status_value: Option<String>,
    pub status_type: Option<String>,
    pub pre_statuses: Option<Vec<String>>,
}

/// `format` of a local field: either a mapping kept in source order or text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFormat {
    Mapping(Literal),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub field_type: FieldType,
    pub persistence: bool,
    pub immutable: bool,
    pub default: Option<Literal>,
    pub metadata: Option<Value>,
    pub dbtype: Option<String>,
    pub length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalField {
    pub name: String,
    pub field_type: FieldType,
    pub persistence: bool,
    pub nullable: bool,
    pub immutable: bool,
    pub unique: bool,
    pub default: Option<Literal>,
    pub enumeration: Option<Value>,
    pub format: Option<FieldFormat>,
    pub metadata: Option<Value>,
    pub alias: Option<String>,
    /// Trigger name → transition, in declaration order
    pub fsm: Option<Vec<(String, Fsm)>>,
    pub dbtype: Option<String>,
    pub length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefField {
    pub name: String,
    pub field_type: FieldType,
    pub ref_class: String,
    pub ref_class_field: String,
    pub persistence: bool,
    pub unique: bool,
    pub metadata: Option<Value>,
    pub dbtype: Option<String>,
    pub length: Option<i64>,
}

/// Options of `@comp.instance_method(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceMethodMeta {
    pub propagation_mode: bool,
    pub topdown: bool,
    pub auto_rollback: bool,
    pub multiplexable_number: i64,
    pub field_order: String,
    pub timeout: Option<i64>,
}

impl Default for InstanceMethodMeta {
    fn default() -> Self {
        Self {
            propagation_mode: false,
            topdown: true,
            auto_rollback: true,
            multiplexable_number: 1,
            field_order: "ascend".into(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethod {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceMethod {
    pub name: String,
    pub body: String,
    pub meta: InstanceMethodMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDefinition {
    pub unit: DefinitionUnit,
    pub identifier: Option<Identifier>,
    pub local_fields: Vec<LocalField>,
    pub ref_fields: Vec<RefField>,
    pub extends: Vec<String>,
    pub persistence: bool,
    pub is_abstract: bool,
    pub api_generation: bool,
    pub api_auto_response: Option<bool>,
    pub scope: Option<String>,
    pub created_at: Option<String>,
    pub class_methods: Vec<ClassMethod>,
    pub instance_methods: Vec<InstanceMethod>,
}

impl RecordDefinition {
    pub fn name(&self) -> &str {
        &self.unit.name
    }

    /// Names of the record's own fields: identifier, local, reference.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.identifier
            .iter()
            .map(|i| i.name.as_str())
            .chain(self.local_fields.iter().map(|f| f.name.as_str()))
            .chain(self.ref_fields.iter().map(|f| f.name.as_str()))
    }

    pub fn has_fields(&self) -> bool {
        self.field_names().next().is_some()
    }
}
