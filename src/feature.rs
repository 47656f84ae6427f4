//! Feature gate for sub-suites
//!
//! A sub-suite may require a feature from the root scope's feature set.
//! Evaluation is split in two phases: [`FeatureRequirement::evaluate`] turns
//! the root's features into an immutable [`FeatureOutcome`], and
//! [`FeatureOutcome::apply`] merges that outcome into the child's freshly
//! built config. The child never writes to a config owned by its parent.

use psan_contract::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::facts::HostOs;
use crate::options::append_options;
use crate::substitution::{CLANGXX_TEMPLATE, CLANG_TEMPLATE};

/// Feature advertised when the build found libdispatch
pub const LIBDISPATCH_FEATURE: &str = "libdispatch";

/// Feature names visible at the root scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<String>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains(feature)
    }

    pub fn insert(&mut self, feature: impl Into<String>) -> bool {
        self.0.insert(feature.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for FeatureSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// What a sub-suite needs from the root feature set, and what it changes
/// when the feature is there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequirement {
    /// Feature that must be present at the root
    pub feature: String,

    /// Fragment appended to each targeted compiler macro
    pub extra_cflags: String,

    /// Compiler macro templates the fragment is appended to
    pub targets: Vec<String>,

    /// Sanitizer options fragment appended on one host OS
    pub host_options: Option<(HostOs, String)>,
}

impl FeatureRequirement {
    /// libdispatch tests need blocks, and on Darwin they must see
    /// non-instrumented modules again.
    pub fn libdispatch() -> Self {
        Self {
            feature: LIBDISPATCH_FEATURE.to_string(),
            extra_cflags: " -fblocks ".to_string(),
            targets: vec![CLANG_TEMPLATE.to_string(), CLANGXX_TEMPLATE.to_string()],
            host_options: Some((
                HostOs::Darwin,
                ":ignore_noninstrumented_modules=1".to_string(),
            )),
        }
    }

    /// Phase one: decide against the root scope's features.
    pub fn evaluate(&self, root_features: &FeatureSet, host: &HostOs) -> FeatureOutcome {
        if !root_features.contains(&self.feature) {
            return FeatureOutcome::Unsupported {
                feature: self.feature.clone(),
            };
        }

        let options_suffix = match &self.host_options {
            Some((on, fragment)) if on == host => Some(fragment.clone()),
            _ => None,
        };

        FeatureOutcome::Augment(FeatureAugmentation {
            cflags_suffix: self.extra_cflags.clone(),
            targets: self.targets.clone(),
            options_suffix,
        })
    }
}

/// Result of evaluating a requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureOutcome {
    /// The feature is absent; the scope is skipped and nothing else changes
    Unsupported { feature: String },

    /// The feature is present
    Augment(FeatureAugmentation),
}

impl FeatureOutcome {
    /// Phase two: merge the outcome into a child config.
    pub fn apply(&self, mut config: ExecutionConfig) -> ExecutionConfig {
        match self {
            Self::Unsupported { feature } => {
                tracing::info!(scope = %config.scope, %feature, "required feature not available");
                config.mark_unsupported(format!("feature '{}' is not available", feature));
                config
            }
            Self::Augment(augmentation) => augmentation.apply(config),
        }
    }
}

/// Changes a present feature makes to a child config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureAugmentation {
    pub cflags_suffix: String,
    pub targets: Vec<String>,
    pub options_suffix: Option<String>,
}

impl FeatureAugmentation {
    /// Append the flag fragment to each targeted macro and the options
    /// fragment to the inherited sanitizer options.
    ///
    /// Appending is cumulative: applying twice appends twice. The resolver
    /// applies an augmentation once per scope, to a config cloned from the
    /// parent's resolved output.
    pub fn apply(&self, mut config: ExecutionConfig) -> ExecutionConfig {
        for target in &self.targets {
            if !config.substitutions.append_to(target, &self.cflags_suffix) {
                tracing::debug!(scope = %config.scope, template = %target, "no macro to augment");
            }
        }

        if let Some(fragment) = &self.options_suffix {
            append_options(&mut config, fragment);
        }
        config
    }
}
