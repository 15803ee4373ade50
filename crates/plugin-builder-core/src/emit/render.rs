//! `{{VARIABLE}}` substitution for generated and starter files.

use std::collections::HashMap;

/// Variables available to file templates.
///
/// | Variable | Example | Source |
/// |----------|---------|--------|
/// | `PLUGIN_ROOT` | "sdk_plugins" | `layout.plugin_root` |
/// | `LIBS_DIR` | "libs" | `layout.libs_dir` |
/// | `SDK_PACKAGE` | "plugin_sdk" | `codegen.sdk_package` |
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    variables: HashMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or overrides a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// Replaces every known `{{KEY}}`; unknown placeholders stay as written.
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_placeholders_only() {
        let ctx = RenderContext::new()
            .with_variable("SDK_PACKAGE", "plugin_sdk")
            .with_variable("PLUGIN_ROOT", "sdk_plugins");
        assert_eq!(
            ctx.render("from {{SDK_PACKAGE}}.x import *  # {{PLUGIN_ROOT}} {{OTHER}}"),
            "from plugin_sdk.x import *  # sdk_plugins {{OTHER}}"
        );
        assert_eq!(ctx.get("SDK_PACKAGE"), Some("plugin_sdk"));
        assert_eq!(ctx.get("OTHER"), None);
    }

    #[test]
    fn repeated_placeholders() {
        let ctx = RenderContext::new().with_variable("A", "x");
        assert_eq!(ctx.render("{{A}}{{A}} {{{A}}}"), "xx {x}");
    }
}
