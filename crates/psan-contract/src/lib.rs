//! PredictiveSanitizer suite contract
//!
//! Defines the execution configuration the suite resolver hands to the
//! external test runner: substitutions, environment, suffixes and the
//! unsupported verdict for one suite scope.

pub mod error;
pub mod execution;
pub mod substitution;

pub use error::ContractError;
pub use execution::{EnvironmentMap, ExecutionConfig};
pub use substitution::{Substitution, SubstitutionTable};

/// Product name every suite name starts with.
pub const SUITE_NAME_PREFIX: &str = "PredictiveSanitizer";

/// Environment variable read by the sanitizer runtime.
pub const OPTIONS_ENV_VAR: &str = "PSAN_OPTIONS";

/// Parallelism group used when the site config leaves it unset.
pub const DEFAULT_PARALLELISM_GROUP: &str = "shadow-memory";

/// Test file suffixes in scope for every psan suite.
pub const DEFAULT_SUFFIXES: &[&str] = &[".c", ".cpp", ".m", ".mm"];
