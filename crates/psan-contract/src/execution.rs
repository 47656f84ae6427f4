//! Execution configuration (execution_config.json)
//!
//! One execution configuration is produced per suite scope. It is owned by
//! the test runner for the rest of the run and is never mutated after
//! resolution.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::ContractError;
use crate::substitution::SubstitutionTable;
use crate::{DEFAULT_PARALLELISM_GROUP, DEFAULT_SUFFIXES, OPTIONS_ENV_VAR};

/// Schema version for execution_config.json
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "psan/execution_config@1";

/// Environment variables set for every test process of a scope
pub type EnvironmentMap = BTreeMap<String, String>;

/// Resolved execution parameters for one suite scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Scope this config was resolved for ("root" or a sub-suite name)
    pub scope: String,

    /// Suite name shown by the runner
    pub name: String,

    /// Directory holding the suite's test sources
    pub test_source_root: String,

    /// Macro tokens in application order
    pub substitutions: SubstitutionTable,

    /// Environment for test processes
    pub environment: EnvironmentMap,

    /// Test file suffixes in scope
    pub suffixes: BTreeSet<String>,

    /// When true the runner skips every test in the scope
    pub unsupported: bool,

    /// Why the scope is unsupported, in the order verdicts were reached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_reasons: Vec<String>,

    /// Label the runner uses to bound concurrent tests
    pub parallelism_group: String,
}

impl ExecutionConfig {
    /// Create an empty, supported config with the default suffixes
    pub fn new(
        scope: impl Into<String>,
        name: impl Into<String>,
        test_source_root: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            scope: scope.into(),
            name: name.into(),
            test_source_root: test_source_root.into(),
            substitutions: SubstitutionTable::new(),
            environment: EnvironmentMap::new(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            unsupported: false,
            unsupported_reasons: Vec::new(),
            parallelism_group: DEFAULT_PARALLELISM_GROUP.to_string(),
        }
    }

    /// Start a sub-suite config from its parent's resolved config.
    ///
    /// Everything is inherited except the scope name and test source root.
    pub fn for_child(&self, scope: impl Into<String>, test_source_root: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            test_source_root: test_source_root.into(),
            ..self.clone()
        }
    }

    /// Mark the scope unsupported. Never cleared once set.
    pub fn mark_unsupported(&mut self, reason: impl Into<String>) {
        self.unsupported = true;
        self.unsupported_reasons.push(reason.into());
    }

    /// Current sanitizer options string, if set
    pub fn sanitizer_options(&self) -> Option<&str> {
        self.environment.get(OPTIONS_ENV_VAR).map(String::as_str)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON, checking the schema identifier
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let config: Self = serde_json::from_str(json)?;
        if config.schema_id != SCHEMA_ID {
            return Err(ContractError::SchemaMismatch {
                expected: SCHEMA_ID.to_string(),
                found: config.schema_id,
            });
        }
        Ok(config)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> Result<(), ContractError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self, ContractError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Human-readable summary
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} [{}]\n", self.name, self.scope));
        if self.unsupported {
            out.push_str("  Status: UNSUPPORTED\n");
            for reason in &self.unsupported_reasons {
                out.push_str(&format!("    - {}\n", reason));
            }
        } else {
            out.push_str("  Status: supported\n");
        }
        out.push_str(&format!("  Source root: {}\n", self.test_source_root));
        out.push_str(&format!("  Parallelism group: {}\n", self.parallelism_group));
        out.push_str(&format!(
            "  Suffixes: {}\n",
            self.suffixes.iter().cloned().collect::<Vec<_>>().join(" ")
        ));
        if !self.environment.is_empty() {
            out.push_str("  Environment:\n");
            for (key, value) in &self.environment {
                out.push_str(&format!("    {}={}\n", key, value));
            }
        }
        out.push_str("  Substitutions:\n");
        for sub in self.substitutions.iter() {
            out.push_str(&format!("    {:?} => {:?}\n", sub.template, sub.replacement));
        }
        out
    }
}
