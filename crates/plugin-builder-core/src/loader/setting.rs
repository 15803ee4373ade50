//! Binding of constructor-call arguments to named parameters.
//!
//! A declaration such as `comp.Setting("POST", "/v1", timeout=3)` is bound
//! against the constructor's parameter list, exactly as Python would bind
//! it, and then read through typed accessors that turn shape problems into
//! [`DomainError::InvalidSetting`].

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::{DomainError, FieldType};
use crate::source::literal::last_segment;
use crate::source::{Call, Literal};

/// Arguments of one call, bound by parameter name.
#[derive(Debug)]
pub struct Arguments<'c> {
    file: &'c str,
    callee: &'c str,
    values: HashMap<&'static str, &'c Literal>,
}

impl<'c> Arguments<'c> {
    /// Binds positionals in parameter order, then keywords by name.
    pub fn bind(
        call: &'c Call,
        params: &[&'static str],
        file: &'c str,
    ) -> Result<Self, DomainError> {
        let callee = call.callee.as_str();
        if call.args.len() > params.len() {
            return Err(DomainError::setting(
                file,
                format!(
                    "'{callee}' takes at most {} positional arguments, {} given",
                    params.len(),
                    call.args.len()
                ),
            ));
        }

        let mut values: HashMap<&'static str, &'c Literal> = params
            .iter()
            .copied()
            .zip(call.args.iter())
            .collect();

        for (key, value) in &call.kwargs {
            let Some(&param) = params.iter().find(|p| **p == key.as_str()) else {
                return Err(DomainError::setting(
                    file,
                    format!("'{callee}' got an unexpected keyword argument '{key}'"),
                ));
            };
            if values.insert(param, value).is_some() {
                return Err(DomainError::setting(
                    file,
                    format!("'{callee}' got multiple values for argument '{key}'"),
                ));
            }
        }

        Ok(Self {
            file,
            callee,
            values,
        })
    }

    fn invalid(&self, name: &str, expected: &str, found: &Literal) -> DomainError {
        DomainError::setting(
            self.file,
            format!(
                "'{}' argument '{name}' must be {expected}, got {}",
                self.callee,
                found.type_name()
            ),
        )
    }

    /// The raw literal, `None` when absent or written as `None`.
    pub fn literal(&self, name: &str) -> Option<&'c Literal> {
        self.values.get(name).copied().filter(|v| !v.is_none())
    }

    pub fn required(&self, name: &str) -> Result<&'c Literal, DomainError> {
        self.literal(name).ok_or_else(|| {
            DomainError::setting(
                self.file,
                format!("'{}' requires argument '{name}'", self.callee),
            )
        })
    }

    pub fn string(&self, name: &str) -> Result<Option<String>, DomainError> {
        match self.literal(name) {
            None => Ok(None),
            Some(Literal::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(name, "a string", other)),
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, DomainError> {
        let value = self.required(name)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(name, "a string", value))
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String, DomainError> {
        Ok(self.string(name)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, DomainError> {
        match self.literal(name) {
            None => Ok(None),
            Some(Literal::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.invalid(name, "a bool", other)),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, DomainError> {
        Ok(self.bool(name)?.unwrap_or(default))
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, DomainError> {
        match self.literal(name) {
            None => Ok(None),
            Some(Literal::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(self.invalid(name, "an int", other)),
        }
    }

    pub fn int_or(&self, name: &str, default: i64) -> Result<i64, DomainError> {
        Ok(self.int(name)?.unwrap_or(default))
    }

    pub fn string_list(&self, name: &str) -> Result<Vec<String>, DomainError> {
        let Some(value) = self.literal(name) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_sequence()
            .ok_or_else(|| self.invalid(name, "a list of strings", value))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| self.invalid(name, "a list of strings", item))
            })
            .collect()
    }

    /// Items of a list argument; empty when absent.
    pub fn sequence(&self, name: &str) -> Result<&'c [Literal], DomainError> {
        match self.literal(name) {
            None => Ok(&[]),
            Some(value) => value
                .as_sequence()
                .ok_or_else(|| self.invalid(name, "a list", value)),
        }
    }

    /// Plain data converted to JSON.
    pub fn json(&self, name: &str) -> Result<Option<Value>, DomainError> {
        self.literal(name)
            .map(|value| to_json(value, self.file))
            .transpose()
    }

    /// A nested constructor call whose last path segment is `expected`.
    pub fn call(&self, name: &str, expected: &str) -> Result<Option<&'c Call>, DomainError> {
        match self.literal(name) {
            None => Ok(None),
            Some(value) => expect_call(value, expected, self.file).map(Some),
        }
    }

    /// Names of referenced classes (`atom.User` or `'User'`).
    pub fn class_names(&self, name: &str) -> Result<Vec<String>, DomainError> {
        self.sequence(name)?
            .iter()
            .map(|item| class_name(item).ok_or_else(|| self.invalid(name, "a class", item)))
            .collect()
    }
}

/// Checks that `value` is a call to `…<expected>(...)`.
pub fn expect_call<'c>(
    value: &'c Literal,
    expected: &str,
    file: &str,
) -> Result<&'c Call, DomainError> {
    match value.as_call() {
        Some(call) if call.short_name() == expected => Ok(call),
        Some(call) => Err(DomainError::setting(
            file,
            format!("expected '{expected}(...)', got '{}(...)'", call.callee),
        )),
        None => Err(DomainError::setting(
            file,
            format!("expected '{expected}(...)', got {}", value.type_name()),
        )),
    }
}

pub fn to_json(value: &Literal, file: &str) -> Result<Value, DomainError> {
    value
        .to_json()
        .map_err(|e| DomainError::setting(file, e.to_string()))
}

/// Class referenced by name or dotted path.
pub fn class_name(value: &Literal) -> Option<String> {
    match value {
        Literal::Name(path) => Some(last_segment(path).to_string()),
        Literal::Str(s) => Some(s.clone()),
        _ => None,
    }
}

/// Decodes a `comp.<TYPE>(...)` constructor.
pub fn field_type(value: &Literal, file: &str) -> Result<FieldType, DomainError> {
    let call = value.as_call().ok_or_else(|| {
        DomainError::setting(
            file,
            format!("field type must be a constructor call, got {}", value.type_name()),
        )
    })?;
    let target = || {
        call.args
            .first()
            .or_else(|| call.kwargs.first().map(|(_, v)| v))
            .and_then(class_name)
            .ok_or_else(|| {
                DomainError::setting(file, format!("'{}' requires a class argument", call.callee))
            })
    };
    let field_type = match call.short_name() {
        "STRING" => FieldType::String,
        "INTEGER" => FieldType::Integer,
        "NUMBER" => FieldType::Number,
        "BOOLEAN" => FieldType::Boolean,
        "DATETIME" => FieldType::DateTime,
        "OBJECT" => FieldType::Object,
        "ARRAY" => FieldType::Array,
        "MU" | "DYNAMIC" => FieldType::Dynamic,
        "CLASS" | "RECORD_REF" => FieldType::RecordRef(target()?),
        "ARRAY_OF_CLASS" | "ARRAY_OF_RECORD_REF" => FieldType::ArrayOfRecordRef(target()?),
        "ARRAY_OF_MU" | "ARRAY_OF_DYNAMIC" => FieldType::ArrayOfDynamic,
        other => {
            return Err(DomainError::setting(
                file,
                format!("invalid field type '{other}'"),
            ));
        }
    };
    Ok(field_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LiteralParser, Tokenizer};

    fn parse(text: &str) -> Literal {
        let tokens = Tokenizer::tokenize(text).unwrap();
        LiteralParser::parse(&tokens).unwrap()
    }

    const PARAMS: &[&str] = &["method", "uri", "transaction", "scope"];

    #[test]
    fn positional_and_keyword_binding() {
        let literal = parse("comp.Setting('POST', '/v1/users', scope='global')");
        let call = literal.as_call().unwrap();
        let args = Arguments::bind(call, PARAMS, "CreateUser.py").unwrap();
        assert_eq!(args.required_string("method").unwrap(), "POST");
        assert_eq!(args.string("uri").unwrap().as_deref(), Some("/v1/users"));
        assert_eq!(args.string_or("scope", "local").unwrap(), "global");
        assert!(args.call("transaction", "Transaction").unwrap().is_none());
    }

    #[test]
    fn unknown_and_repeated_arguments_fail() {
        let literal = parse("comp.Setting('POST', method='GET')");
        let err = Arguments::bind(literal.as_call().unwrap(), PARAMS, "f.py").unwrap_err();
        assert!(err.to_string().contains("multiple values for argument 'method'"));

        let literal = parse("comp.Setting(verb='GET')");
        let err = Arguments::bind(literal.as_call().unwrap(), PARAMS, "f.py").unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'verb'"));

        let literal = parse("comp.Setting(1, 2, 3, 4, 5)");
        assert!(Arguments::bind(literal.as_call().unwrap(), PARAMS, "f.py").is_err());
    }

    #[test]
    fn typed_accessors_reject_wrong_shapes() {
        let literal = parse("comp.Setting(method=1, uri=None)");
        let args = Arguments::bind(literal.as_call().unwrap(), PARAMS, "f.py").unwrap();
        let err = args.string("method").unwrap_err();
        assert!(matches!(err, DomainError::InvalidSetting { .. }));
        assert!(err.to_string().contains("must be a string, got int"));
        assert_eq!(args.string("uri").unwrap(), None);
        assert!(args.required("uri").is_err());
    }

    #[test]
    fn field_types_and_aliases() {
        assert_eq!(field_type(&parse("comp.STRING()"), "f").unwrap(), FieldType::String);
        assert_eq!(field_type(&parse("comp.DYNAMIC()"), "f").unwrap(), FieldType::Dynamic);
        assert_eq!(
            field_type(&parse("comp.CLASS(atom.Account)"), "f").unwrap(),
            FieldType::RecordRef("Account".into())
        );
        assert_eq!(
            field_type(&parse("comp.ARRAY_OF_RECORD_REF(cls=atom.Tag)"), "f").unwrap(),
            FieldType::ArrayOfRecordRef("Tag".into())
        );
        assert!(field_type(&parse("comp.DECIMAL()"), "f").is_err());
        assert!(field_type(&parse("'string'"), "f").is_err());
    }

    #[test]
    fn class_lists_accept_names_and_strings() {
        let literal = parse("comp.Setting(extends=[atom.Base, 'Other'])");
        let args = Arguments::bind(literal.as_call().unwrap(), &["extends"], "f.py").unwrap();
        assert_eq!(args.class_names("extends").unwrap(), vec!["Base", "Other"]);
    }
}
