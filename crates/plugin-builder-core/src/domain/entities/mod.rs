pub mod daemon;
pub mod definition;
pub mod module;
pub mod output;
pub mod record;
pub mod scenario;

pub use daemon::{DaemonDefinition, DaemonStatus};
pub use definition::{DefinitionKind, DefinitionUnit};
pub use module::ModuleDefinition;
pub use output::{OutputFile, OutputTree};
pub use record::{
    ClassMethod, FieldFormat, FieldType, Fsm, Identifier, InstanceMethod, InstanceMethodMeta,
    LocalField, RecordDefinition, RefField,
};
pub use scenario::{
    Command, GlobalVariable, Hooks, HttpMethod, RequestValidation, ScenarioDefinition, Script,
    Transaction,
};
