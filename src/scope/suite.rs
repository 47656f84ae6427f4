//! Sub-suite local rules
//!
//! Each sub-suite directory of the psan tests carries a handful of local
//! rules applied on top of its parent's resolved config.

use crate::facts::HostOs;
use crate::feature::FeatureRequirement;

/// Rule applied when resolving a sub-suite scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalRule {
    /// Needs a root feature; adjusts compiler macros when present
    RequireFeature(FeatureRequirement),

    /// Only runs on the given host OS
    HostOnly(HostOs),

    /// Appends an options fragment to PSAN_OPTIONS on the given host OS
    AppendOptions { host: HostOs, fragment: String },
}

/// A named sub-suite and its rules, applied in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSuite {
    pub name: String,
    pub rules: Vec<LocalRule>,
}

impl SubSuite {
    pub fn new(name: impl Into<String>, rules: Vec<LocalRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// `Darwin/`: Darwin-only, with non-instrumented modules ignored again
    pub fn darwin() -> Self {
        Self::new(
            "Darwin",
            vec![
                LocalRule::HostOnly(HostOs::Darwin),
                LocalRule::AppendOptions {
                    host: HostOs::Darwin,
                    fragment: ":ignore_noninstrumented_modules=1".to_string(),
                },
            ],
        )
    }

    /// `Linux/`: Linux-only
    pub fn linux() -> Self {
        Self::new("Linux", vec![LocalRule::HostOnly(HostOs::Linux)])
    }

    /// `libdispatch/`: needs the libdispatch feature
    pub fn libdispatch() -> Self {
        Self::new(
            "libdispatch",
            vec![LocalRule::RequireFeature(FeatureRequirement::libdispatch())],
        )
    }

    /// Sub-suites shipped with the psan tests
    pub fn standard() -> Vec<Self> {
        vec![Self::darwin(), Self::linux(), Self::libdispatch()]
    }
}
