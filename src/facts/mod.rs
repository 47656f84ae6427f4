//! Host and toolchain facts
//!
//! `ConfigFacts` is the raw bag deserialized from the merged configuration
//! layers; any field may be absent. `SuiteFacts` is the validated view the
//! resolver works from: every required attribute is present and truthy.

mod host;
mod truthy;

pub use host::{CompilerId, HostOs};
pub use truthy::{is_missing, required, Truthy};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ResolveError;
use crate::feature::FeatureSet;

/// Script that reruns a flaky test, relative to the suite source root
pub const DEFLAKE_SCRIPT_NAME: &str = "deflake.bash";

/// Facts supplied by the build for one suite load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFacts {
    /// Appended to the suite name (e.g. "-x86_64")
    pub name_suffix: String,

    pub host_os: Option<HostOs>,

    pub compiler_id: Option<CompilerId>,

    pub target_arch: Option<String>,

    /// Target-specific compiler flags, passed through as one fragment
    pub target_cflags: String,

    pub debug_info_flags: Vec<String>,

    /// Flags that put the driver in C++ mode
    pub cxx_mode_flags: Vec<String>,

    /// Tests target an Android runtime
    pub android: bool,

    pub parallelism_group: Option<String>,

    /// An instrumented libc++ was built for this architecture
    pub has_libcxx: bool,

    /// Retry count handed to the deflake script
    pub deflake_threshold: Option<u32>,

    /// compiler-rt build object root
    pub compiler_rt_obj_root: Option<String>,

    /// Compiler executable under test
    pub clang: Option<String>,

    /// Directory holding the suite's lit tests
    pub test_source_root: Option<String>,

    /// Deflake script path (defaults to `<test_source_root>/deflake.bash`)
    pub deflake_script: Option<String>,

    /// ASLR-disabling wrapper, required on NetBSD
    pub netbsd_noaslr_prefix: Option<String>,

    /// Features visible at the root scope
    pub available_features: FeatureSet,
}

/// Validated facts, every required attribute present
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteFacts {
    pub name_suffix: String,
    pub host_os: HostOs,
    pub compiler_id: CompilerId,
    pub target_arch: String,
    pub target_cflags: String,
    pub debug_info_flags: Vec<String>,
    pub cxx_mode_flags: Vec<String>,
    pub android: bool,
    pub parallelism_group: Option<String>,
    pub has_libcxx: bool,
    pub deflake_threshold: u32,
    pub compiler_rt_obj_root: String,
    pub clang: String,
    pub test_source_root: String,
    pub deflake_script: String,
    pub netbsd_noaslr_prefix: Option<String>,
    pub available_features: FeatureSet,
}

impl ConfigFacts {
    /// Validate required attributes, failing on the first missing one.
    pub fn validate(&self) -> Result<SuiteFacts, ResolveError> {
        let host_os = required("host_os", self.host_os.as_ref())?.clone();
        let compiler_id = required("compiler_id", self.compiler_id.as_ref())?.clone();
        let target_arch = required("target_arch", self.target_arch.as_ref())?.clone();
        let deflake_threshold = *required("deflake_threshold", self.deflake_threshold.as_ref())?;
        let compiler_rt_obj_root =
            required("compiler_rt_obj_root", self.compiler_rt_obj_root.as_ref())?.clone();
        let clang = required("clang", self.clang.as_ref())?.clone();
        let test_source_root =
            required("test_source_root", self.test_source_root.as_ref())?.clone();

        let deflake_script = match self.deflake_script.as_ref() {
            Some(script) => required("deflake_script", Some(script))?.clone(),
            None => Path::new(&test_source_root)
                .join(DEFLAKE_SCRIPT_NAME)
                .to_string_lossy()
                .to_string(),
        };

        if host_os == HostOs::NetBSD {
            required("netbsd_noaslr_prefix", self.netbsd_noaslr_prefix.as_ref())?;
        }

        Ok(SuiteFacts {
            name_suffix: self.name_suffix.clone(),
            host_os,
            compiler_id,
            target_arch,
            target_cflags: self.target_cflags.clone(),
            debug_info_flags: self.debug_info_flags.clone(),
            cxx_mode_flags: self.cxx_mode_flags.clone(),
            android: self.android,
            parallelism_group: self.parallelism_group.clone(),
            has_libcxx: self.has_libcxx,
            deflake_threshold,
            compiler_rt_obj_root,
            clang,
            test_source_root,
            deflake_script,
            netbsd_noaslr_prefix: self.netbsd_noaslr_prefix.clone(),
            available_features: self.available_features.clone(),
        })
    }

    /// Every missing required attribute, in validation order
    pub fn missing_attributes(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_missing(self.host_os.as_ref()) {
            missing.push("host_os");
        }
        if is_missing(self.compiler_id.as_ref()) {
            missing.push("compiler_id");
        }
        if is_missing(self.target_arch.as_ref()) {
            missing.push("target_arch");
        }
        if is_missing(self.deflake_threshold.as_ref()) {
            missing.push("deflake_threshold");
        }
        if is_missing(self.compiler_rt_obj_root.as_ref()) {
            missing.push("compiler_rt_obj_root");
        }
        if is_missing(self.clang.as_ref()) {
            missing.push("clang");
        }
        if is_missing(self.test_source_root.as_ref()) {
            missing.push("test_source_root");
        }
        if self.deflake_script.is_some() && is_missing(self.deflake_script.as_ref()) {
            missing.push("deflake_script");
        }
        if self.host_os == Some(HostOs::NetBSD) && is_missing(self.netbsd_noaslr_prefix.as_ref()) {
            missing.push("netbsd_noaslr_prefix");
        }
        missing
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Complete Linux/Clang facts with the libdispatch feature available
    pub fn linux_facts() -> ConfigFacts {
        ConfigFacts {
            host_os: Some(HostOs::Linux),
            compiler_id: Some(CompilerId::Clang),
            target_arch: Some("x86_64".to_string()),
            target_cflags: "-m64".to_string(),
            debug_info_flags: vec!["-gline-tables-only".to_string()],
            cxx_mode_flags: vec!["--driver-mode=g++".to_string()],
            deflake_threshold: Some(10),
            compiler_rt_obj_root: Some("/build/projects/compiler-rt".to_string()),
            clang: Some("/build/bin/clang".to_string()),
            test_source_root: Some("/src/compiler-rt/test/psan".to_string()),
            available_features: FeatureSet::from_iter(["libdispatch", "shell"]),
            ..ConfigFacts::default()
        }
    }

    pub fn facts_on(host: HostOs) -> ConfigFacts {
        let mut facts = linux_facts();
        if host == HostOs::NetBSD {
            facts.netbsd_noaslr_prefix = Some("/usr/sbin/paxctl +a".to_string());
        }
        facts.host_os = Some(host);
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_validate_complete_facts() {
        let facts = linux_facts().validate().unwrap();
        assert_eq!(facts.host_os, HostOs::Linux);
        assert_eq!(facts.deflake_threshold, 10);
        assert_eq!(facts.deflake_script, "/src/compiler-rt/test/psan/deflake.bash");
    }

    #[test]
    fn test_validate_reports_first_missing() {
        let mut facts = linux_facts();
        facts.target_arch = None;
        facts.clang = Some(String::new());

        let err = facts.validate().unwrap_err();
        assert!(matches!(err, ResolveError::MissingAttribute { ref name } if name == "target_arch"));
    }

    #[test]
    fn test_zero_threshold_is_missing() {
        let mut facts = linux_facts();
        facts.deflake_threshold = Some(0);
        assert!(facts.validate().is_err());
        assert_eq!(facts.missing_attributes(), vec!["deflake_threshold"]);
    }

    #[test]
    fn test_netbsd_requires_noaslr_prefix() {
        let mut facts = linux_facts();
        facts.host_os = Some(HostOs::NetBSD);

        let err = facts.validate().unwrap_err();
        assert!(err.to_string().contains("netbsd_noaslr_prefix"));
        assert_eq!(facts.missing_attributes(), vec!["netbsd_noaslr_prefix"]);

        assert!(facts_on(HostOs::NetBSD).validate().is_ok());
    }

    #[test]
    fn test_missing_attributes_lists_all() {
        let missing = ConfigFacts::default().missing_attributes();
        assert_eq!(
            missing,
            vec![
                "host_os",
                "compiler_id",
                "target_arch",
                "deflake_threshold",
                "compiler_rt_obj_root",
                "clang",
                "test_source_root",
            ]
        );
    }

    #[test]
    fn test_explicit_deflake_script() {
        let mut facts = linux_facts();
        facts.deflake_script = Some("/opt/deflake.sh".to_string());
        assert_eq!(facts.validate().unwrap().deflake_script, "/opt/deflake.sh");

        facts.deflake_script = Some(String::new());
        assert!(facts.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let facts: ConfigFacts = serde_json::from_value(serde_json::json!({
            "host_os": "Darwin",
            "compiler_id": "GNU",
            "deflake_threshold": 3,
            "available_features": ["libdispatch"]
        }))
        .unwrap();

        assert_eq!(facts.host_os, Some(HostOs::Darwin));
        assert_eq!(facts.compiler_id, Some(CompilerId::Gnu));
        assert!(facts.available_features.contains("libdispatch"));
        assert!(!facts.android);
    }
}
