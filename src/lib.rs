//! PredictiveSanitizer suite configuration
//!
//! Resolves, from host and toolchain facts, what the test runner needs to
//! run the psan lit suite: compiler invocation macros, the PSAN_OPTIONS
//! environment, test suffixes, and whether each scope runs on this host.

pub mod config;
pub mod error;
pub mod facts;
pub mod feature;
pub mod logging;
pub mod options;
pub mod resolve;
pub mod scope;
pub mod substitution;
pub mod support;

pub use config::{ConfigError, LoadedFacts};
pub use error::ResolveError;
pub use facts::{CompilerId, ConfigFacts, HostOs, SuiteFacts};
pub use feature::{FeatureOutcome, FeatureRequirement, FeatureSet};
pub use options::SanitizerOptions;
pub use resolve::{resolve_suite, Resolver, SuiteResolution};
pub use scope::{LocalRule, ScopeId, ScopeTree, SubSuite};

pub use psan_contract::{ExecutionConfig, Substitution, SubstitutionTable};
