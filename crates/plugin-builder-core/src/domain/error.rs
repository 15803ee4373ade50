// ============================================================================
// domain/error.rs - DEFINITION PIPELINE ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::entities::DefinitionKind;

/// Root domain error type.
///
/// Every variant belongs to exactly one [`ErrorCategory`]; all of them abort
/// the current run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Structural duplicates
    // ========================================================================
    #[error("Duplicate {kind} '{name}' detected")]
    DuplicateDefinition { kind: DefinitionKind, name: String },

    #[error("Field '{field}' of '{record}' is already defined by the record or an ancestor")]
    DuplicateField { record: String, field: String },

    #[error("Duplicate output path: {path}")]
    DuplicatePath { path: String },

    // ========================================================================
    // References
    // ========================================================================
    #[error("'{entity}' does not exist in '{file}'")]
    MissingEntity { entity: String, file: String },

    #[error("'{owner}' in '{file}' must define '{hook}'")]
    MissingHook {
        owner: String,
        hook: String,
        file: String,
    },

    #[error("'{record}' extends unknown record '{parent}'")]
    UnknownParent { record: String, parent: String },

    // ========================================================================
    // Shape
    // ========================================================================
    #[error("Base class must be 'classes.{record}' for '{record}', found '{parent}'")]
    InvalidParent { record: String, parent: String },

    #[error("Invalid command name '{name}' in '{file}'. Correct name is '{expected}'.")]
    InvalidCommandName {
        name: String,
        expected: String,
        file: String,
    },

    #[error("'{name}' in '{file}' derives from '{base}', which is not a {kind} command")]
    UnsupportedCommand {
        name: String,
        base: String,
        kind: DefinitionKind,
        file: String,
    },

    #[error("Invalid setting in '{file}': {reason}")]
    InvalidSetting { file: String, reason: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    // ========================================================================
    // Ordering
    // ========================================================================
    #[error("Cycles detected: {graph}")]
    CycleDetected { graph: String },

    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("workspace must not be empty in '{file}'")]
    EmptyWorkspace { file: String },

    // ========================================================================
    // Extraction
    // ========================================================================
    #[error("Cannot read '{file}': {reason}")]
    Extraction { file: String, reason: String },
}

impl DomainError {
    pub(crate) fn setting(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn extraction(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DuplicateDefinition { kind, name } => vec![
                format!("Every {kind} file name must be unique across all workspaces"),
                format!("Rename one of the '{name}.py' files"),
            ],
            Self::DuplicateField { record, field } => vec![
                format!("Rename '{field}' in '{record}' or remove it from the ancestor"),
            ],
            Self::MissingEntity { entity, .. } => vec![
                format!("Define 'class {entity}' in the file"),
                "Record files must be named after the class they define".into(),
            ],
            Self::MissingHook { hook, .. } => vec![format!("Add a '{hook}' method")],
            Self::UnknownParent { parent, .. } => vec![
                format!("Create a record named '{parent}' under plugins/*/classes/"),
                "Or remove it from 'extends'".into(),
            ],
            Self::InvalidParent { record, .. } => {
                vec![format!("Declare the record as 'class {record}(classes.{record}):'")]
            }
            Self::InvalidCommandName { expected, .. } => vec![
                "Commands are numbered Command0, Command1, ... without gaps".into(),
                format!("Rename the command to '{expected}'"),
            ],
            Self::UnsupportedCommand { kind, .. } => match kind {
                DefinitionKind::Daemon => vec!["Daemon commands must derive from 'comp.Script'".into()],
                _ => vec![
                    "Use one of: RequestValidation, Script, Breakpoint, Serve, Sleep, Custom".into(),
                ],
            },
            Self::InvalidSetting { .. } => vec![
                "'__setting__' must return a literal 'comp.Setting(...)' call".into(),
                "Only literals, lists, dicts and comp.* constructors are allowed".into(),
            ],
            Self::CycleDetected { .. } => {
                vec!["Remove the circular 'extends' relationship between records".into()]
            }
            Self::EmptyWorkspace { .. } => vec![
                "Remove the 'workspace' argument to derive it from the file path".into(),
            ],
            Self::Extraction { .. } => vec!["Check the file for syntax errors".into()],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateDefinition { .. }
            | Self::DuplicateField { .. }
            | Self::DuplicatePath { .. } => ErrorCategory::StructuralDuplicate,
            Self::MissingEntity { .. } | Self::MissingHook { .. } | Self::UnknownParent { .. } => {
                ErrorCategory::Reference
            }
            Self::InvalidParent { .. }
            | Self::InvalidCommandName { .. }
            | Self::UnsupportedCommand { .. }
            | Self::InvalidSetting { .. }
            | Self::AbsolutePathNotAllowed { .. } => ErrorCategory::Shape,
            Self::CycleDetected { .. } => ErrorCategory::Cycle,
            Self::EmptyWorkspace { .. } => ErrorCategory::Configuration,
            Self::Extraction { .. } => ErrorCategory::Extraction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    StructuralDuplicate,
    Reference,
    Shape,
    Cycle,
    Configuration,
    Extraction,
}
