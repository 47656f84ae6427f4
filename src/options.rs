//! Sanitizer runtime options (PSAN_OPTIONS)

use psan_contract::{ExecutionConfig, OPTIONS_ENV_VAR};

use crate::error::ResolveError;
use crate::facts::HostOs;

/// Option every lit run starts from
pub const BASELINE_OPTION: &str = "atexit_sleep_ms=0";

/// Darwin runtime defaults that slow tests down or hide the races they check
pub const DARWIN_OPTIONS: &[&str] = &[
    "abort_on_error=0",
    "ignore_noninstrumented_modules=0",
    "ignore_interceptors_accesses=0",
];

/// Macro that lets a test set its own options on top of the baseline
pub const ENV_OPTS_TEMPLATE: &str = "%env_psan_opts=";

/// Colon-delimited KEY=VALUE options for the sanitizer runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerOptions {
    fragments: Vec<String>,
}

impl SanitizerOptions {
    /// Defaults for lit runs on `host`
    pub fn for_host(host: &HostOs) -> Self {
        let mut options = Self {
            fragments: vec![BASELINE_OPTION.to_string()],
        };
        if *host == HostOs::Darwin {
            for fragment in DARWIN_OPTIONS {
                options.push(*fragment);
            }
        }
        options
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn value(&self) -> String {
        self.fragments.join(":")
    }

    /// The value with a trailing separator, ready for more options
    pub fn prefix(&self) -> String {
        let value = self.value();
        if value.is_empty() {
            value
        } else {
            value + ":"
        }
    }

    /// Expansion of `%env_psan_opts=`
    pub fn env_invocation(&self) -> String {
        format!("env {}={}", OPTIONS_ENV_VAR, self.prefix())
    }

    /// Set the options variable and register the override macro.
    pub fn apply(&self, config: &mut ExecutionConfig) -> Result<(), ResolveError> {
        let value = self.value();
        if !value.is_empty() {
            config.environment.insert(OPTIONS_ENV_VAR.to_string(), value);
        }
        config.substitutions.insert(ENV_OPTS_TEMPLATE, self.env_invocation())?;
        Ok(())
    }
}

/// Suffix an options fragment onto the value a config already carries.
///
/// The existing value is never replaced. A config without options gets the
/// fragment alone, minus its leading separator.
pub fn append_options(config: &mut ExecutionConfig, fragment: &str) {
    match config.environment.get_mut(OPTIONS_ENV_VAR) {
        Some(value) => value.push_str(fragment),
        None => {
            config.environment.insert(
                OPTIONS_ENV_VAR.to_string(),
                fragment.trim_start_matches(':').to_string(),
            );
        }
    }
}
