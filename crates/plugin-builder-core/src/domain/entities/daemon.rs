use std::fmt;
use std::str::FromStr;

use super::{DefinitionUnit, GlobalVariable, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DaemonStatus {
    Active,
    #[default]
    Inactive,
}

impl DaemonStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            DaemonStatus::Active => "active",
            DaemonStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for DaemonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DaemonStatus::Active),
            "inactive" => Ok(DaemonStatus::Inactive),
            other => Err(format!("status must be 'active' or 'inactive', got '{other}'")),
        }
    }
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled job. Its commands are scripts without cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonDefinition {
    pub unit: DefinitionUnit,
    pub unlimited: bool,
    pub count: i64,
    pub interval: i64,
    pub status: DaemonStatus,
    pub global_variables: Vec<GlobalVariable>,
    pub commands: Vec<Script>,
}
