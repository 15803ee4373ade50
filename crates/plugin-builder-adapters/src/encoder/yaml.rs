//! YAML encoding of configuration documents.
//!
//! Documents arrive as `serde_json::Value` trees whose objects are ordered
//! maps, so keys come out sorted. Multi-line strings are emitted as literal
//! block scalars, which YAML only allows without trailing spaces before a
//! line break; those spaces and any trailing whitespace at the end of the
//! string are dropped first.

use std::sync::LazyLock;

use plugin_builder_core::{
    application::{ApplicationError, ports::DocumentEncoder},
    error::BuilderResult,
};
use regex::Regex;
use serde_json::Value;
use tracing::trace;

static SPACES_BEFORE_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +\n").unwrap());
static TRAILING_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \n]+\z").unwrap());

/// Encodes documents as YAML with serde_yaml.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl YamlEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentEncoder for YamlEncoder {
    fn encode(&self, name: &str, document: &Value) -> BuilderResult<String> {
        let normalized = normalize(document);
        let text = serde_yaml::to_string(&normalized).map_err(|e| {
            ApplicationError::EncodingFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        trace!(name, bytes = text.len(), "document encoded");
        Ok(text)
    }

    fn extension(&self) -> &'static str {
        "yml"
    }
}

/// Applies [`block_text`] to every string in the tree.
fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(block_text(s)),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Single-line strings pass through untouched.
fn block_text(s: &str) -> String {
    if !s.contains('\n') {
        return s.to_string();
    }
    let s = SPACES_BEFORE_NEWLINE.replace_all(s, "\n");
    TRAILING_WHITESPACE.replace(&s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_text_strips_trailing_spaces() {
        assert_eq!(block_text("a  \nb \n\n  \n"), "a\nb");
        assert_eq!(block_text("single line  "), "single line  ");
        assert_eq!(block_text("x\n"), "x");
    }

    #[test]
    fn keys_are_sorted() {
        let doc = json!({"version": 1, "category": "default", "name": "User"});
        let yaml = YamlEncoder::new().encode("User", &doc).unwrap();
        assert_eq!(yaml, "category: default\nname: User\nversion: 1\n");
    }

    #[test]
    fn multi_line_strings_become_literal_blocks() {
        let doc = json!({"code": "first = 1   \nsecond = 2\n"});
        let yaml = YamlEncoder::new().encode("m", &doc).unwrap();
        assert!(yaml.starts_with("code: |"), "{yaml}");
        assert!(yaml.contains("  first = 1\n  second = 2"), "{yaml}");

        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["code"], "first = 1\nsecond = 2");
    }

    #[test]
    fn nested_strings_are_normalized() {
        let doc = json!({"commands": [{"kwargs": {"code": "a \nb\n"}}], "n": null});
        let yaml = YamlEncoder::new().encode("s", &doc).unwrap();
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["commands"][0]["kwargs"]["code"], "a\nb");
        assert_eq!(parsed["n"], Value::Null);
    }
}
