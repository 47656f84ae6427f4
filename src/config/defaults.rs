//! Built-in defaults (layer 1)
//!
//! Only optional facts have defaults. Required facts are left unset so a
//! missing site config is reported instead of papered over.

use serde::{Deserialize, Serialize};

/// Built-in default fact values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Suite name suffix (default: none)
    pub name_suffix: String,

    /// Target-specific compiler flags (default: none)
    pub target_cflags: String,

    /// Debug info flags (default: none)
    pub debug_info_flags: Vec<String>,

    /// C++ driver mode flags (default: none)
    pub cxx_mode_flags: Vec<String>,

    /// Android target (default: false)
    pub android: bool,

    /// Instrumented libc++ available (default: false)
    pub has_libcxx: bool,

    /// Root features (default: none)
    pub available_features: Vec<String>,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            name_suffix: String::new(),
            target_cflags: String::new(),
            debug_info_flags: Vec::new(),
            cxx_mode_flags: Vec::new(),
            android: false,
            has_libcxx: false,
            available_features: Vec::new(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "name_suffix": self.name_suffix,
            "target_cflags": self.target_cflags,
            "debug_info_flags": self.debug_info_flags,
            "cxx_mode_flags": self.cxx_mode_flags,
            "android": self.android,
            "has_libcxx": self.has_libcxx,
            "available_features": self.available_features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert!(!defaults.android);
        assert!(!defaults.has_libcxx);
        assert!(defaults.name_suffix.is_empty());
        assert!(defaults.available_features.is_empty());
    }

    #[test]
    fn test_no_required_fact_defaulted() {
        let value = BuiltinDefaults::default().to_value();
        for key in ["host_os", "compiler_id", "target_arch", "clang", "deflake_threshold"] {
            assert!(value.get(key).is_none(), "{} must come from the site config", key);
        }
        assert_eq!(value["android"], false);
    }
}
