//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the
//! [`ScaffoldOptions`] derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. `--config FILE` (must exist)
//! 2. `<config dir>/config.toml` from `directories::ProjectDirs`, if present
//! 3. Built-in defaults
//!
//! Missing keys in a file fall back to the defaults.
//!
//! ```toml
//! [layout]
//! plugin_root = "sdk_plugins"
//! libs_dir = "libs"
//!
//! [codegen]
//! sdk_package = "plugin_sdk"
//!
//! [output]
//! no_color = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use plugin_builder_core::emit::ScaffoldOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where definitions and generated code live inside a project.
    pub layout: LayoutConfig,
    /// What the generated scaffolding imports.
    pub codegen: CodegenConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub plugin_root: String,
    pub libs_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub sdk_package: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let options = ScaffoldOptions::default();
        Self {
            plugin_root: options.plugin_root,
            libs_dir: options.libs_dir,
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            sdk_package: ScaffoldOptions::default().sdk_package,
        }
    }
}

impl AppConfig {
    /// Load configuration following the resolution order above.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = config_file {
            return Self::from_file(path);
        }
        let default_path = Self::config_path();
        if default_path.is_file() {
            return Self::from_file(&default_path);
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.plugin-builder.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "plugin-builder", "plugin-builder")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".plugin-builder.toml"))
    }

    pub fn scaffold_options(&self) -> ScaffoldOptions {
        ScaffoldOptions {
            plugin_root: self.layout.plugin_root.clone(),
            libs_dir: self.layout.libs_dir.clone(),
            sdk_package: self.codegen.sdk_package.clone(),
        }
    }
}
