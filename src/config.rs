//! Parser configuration, loadable from TOML.
//!
//! ```toml
//! # xmlmap.toml
//! locale_prefix = "de."
//!
//! [validation]
//! default_namespace = "http://josm.openstreetmap.de/tagging-preset-1.0"
//! schema = "resource://data/tagging-preset.xsd"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings applied when an [`XmlObjectParser`](crate::XmlObjectParser) is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Prefix marking locale-specific attributes such as `de.name`.
    pub locale_prefix: Option<String>,

    /// Validate every parse against this schema.
    #[serde(default)]
    pub validation: Option<ValidationConfig>,
}

/// Schema validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Namespace injected into unqualified elements before validation
    #[serde(default)]
    pub default_namespace: String,

    /// Logical name of the schema resource
    pub schema: String,
}

impl ParserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Set the locale attribute prefix
    pub fn with_locale_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.locale_prefix = Some(prefix.into());
        self
    }

    /// Validate against `schema`, injecting `default_namespace` first
    pub fn with_validation(
        mut self,
        default_namespace: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        self.validation = Some(ValidationConfig {
            default_namespace: default_namespace.into(),
            schema: schema.into(),
        });
        self
    }
}
