//! Loaded facts with provenance
//!
//! Records the merged fact bag together with where each layer came from, so
//! a resolved suite can be traced back to the files that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::facts::ConfigFacts;

/// Schema identifier for loaded_facts.json
pub const SCHEMA_ID: &str = "psan/loaded_facts@1";

/// Origin of a configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Site,
    Local,
    Cli,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged facts for one suite load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedFacts {
    pub schema_id: String,

    /// When the layers were merged
    pub created_at: DateTime<Utc>,

    /// Typed view of the merged layers
    pub facts: ConfigFacts,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl LoadedFacts {
    /// Merge the layers.
    ///
    /// The site config must exist when given; a missing local config is
    /// skipped.
    pub fn build(
        site_config_path: Option<&Path>,
        local_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = site_config_path {
            let (value, digest) = load_toml_file(path)?;
            tracing::debug!(path = %path.display(), %digest, "loaded site config");
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Site,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(path) = local_config_path {
            if path.exists() {
                let (value, digest) = load_toml_file(path)?;
                tracing::debug!(path = %path.display(), %digest, "loaded local config");
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::Local,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else {
                tracing::debug!(path = %path.display(), "no local config");
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let facts: ConfigFacts = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            facts,
            sources,
        })
    }

    /// Add root features on top of whatever the layers declared
    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.facts.available_features.extend(features);
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Load and parse a TOML file, returning the value and digest
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

    let table: toml::Table = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    Ok((toml_to_json(toml::Value::Table(table)), digest))
}

/// Convert a TOML value to JSON
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
