use super::DefinitionUnit;

/// Free-form code shipped as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefinition {
    pub unit: DefinitionUnit,
    pub code: String,
}
