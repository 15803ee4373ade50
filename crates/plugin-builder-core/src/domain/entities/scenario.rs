use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::DefinitionUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!(
                "method must be one of GET, POST, PUT, PATCH, DELETE, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction options of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub enable: bool,
    pub xdomain: String,
    pub xtype: String,
    pub xname: String,
    pub xname_use_counter: bool,
    pub auto_rollback: bool,
    pub auto_begin: bool,
    pub auto_response: bool,
    pub lock_keys: Vec<String>,
    pub retry_count: i64,
    pub retry_interval: i64,
    pub timeout: Option<i64>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            enable: false,
            xdomain: String::new(),
            xtype: String::new(),
            xname: String::new(),
            xname_use_counter: false,
            auto_rollback: true,
            auto_begin: true,
            auto_response: false,
            lock_keys: Vec::new(),
            retry_count: 0,
            retry_interval: 0,
            timeout: None,
        }
    }
}

/// A module-level `name = comp.global_variable(...)` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    pub description: String,
    pub initial: Value,
}

/// Optional aspect hooks shared by validation and script commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hooks {
    pub pre_process: Option<String>,
    pub post_process: Option<String>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        self.pre_process.is_none() && self.post_process.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestValidation {
    pub label: Option<String>,
    pub body: Option<Value>,
    pub resources: Option<Value>,
    pub params: Option<Value>,
    pub headers: Option<Value>,
    pub hooks: Hooks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub label: Option<String>,
    pub code: String,
    pub cancellable: bool,
    pub cancel_code: Option<String>,
    pub hooks: Hooks,
}

/// One step of a scenario, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RequestValidation(RequestValidation),
    Script(Script),
    Breakpoint { label: Option<String> },
    Serve { label: Option<String> },
    Sleep { label: Option<String>, seconds: Value },
    Custom { label: Option<String>, id: Option<String> },
}

impl Command {
    /// Base class names accepted for command declarations.
    pub const BASES: [&'static str; 6] = [
        "RequestValidation",
        "Script",
        "Custom",
        "Breakpoint",
        "Serve",
        "Sleep",
    ];

    pub fn label(&self) -> Option<&str> {
        match self {
            Command::RequestValidation(v) => v.label.as_deref(),
            Command::Script(s) => s.label.as_deref(),
            Command::Breakpoint { label }
            | Command::Serve { label }
            | Command::Sleep { label, .. }
            | Command::Custom { label, .. } => label.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDefinition {
    pub unit: DefinitionUnit,
    pub method: HttpMethod,
    pub uri: String,
    pub additional_paths: Vec<String>,
    pub scope: String,
    pub request_timeout: i64,
    pub connect_timeout: i64,
    pub routing_auto_generation_mode: bool,
    pub transaction: Transaction,
    pub global_variables: Vec<GlobalVariable>,
    pub commands: Vec<Command>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_upper_case_only() {
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("get".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn transaction_defaults() {
        let tx = Transaction::default();
        assert!(!tx.enable);
        assert!(tx.auto_rollback && tx.auto_begin);
        assert!(tx.lock_keys.is_empty());
        assert_eq!(tx.timeout, None);
    }
}
