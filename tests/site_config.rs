//! Site config loading through to the runner handoff
//!
//! Writes site/local TOML files the way a build tree would, loads them with
//! CLI-style overrides and checks the execution configs that come out.

use psan_suite_config::config::parse_overrides;
use psan_suite_config::{resolve_suite, ExecutionConfig, HostOs, LoadedFacts};
use std::fs;
use tempfile::TempDir;

const SITE_TOML: &str = r#"
name_suffix = "-x86_64"
host_os = "Linux"
compiler_id = "Clang"
target_arch = "x86_64"
target_cflags = "-m64"
debug_info_flags = ["-gline-tables-only"]
cxx_mode_flags = ["--driver-mode=g++"]
android = false
deflake_threshold = 10
compiler_rt_obj_root = "/build/projects/compiler-rt"
clang = "/build/bin/clang"
test_source_root = "/src/compiler-rt/test/psan"
available_features = ["shell"]
"#;

fn write_site(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("psan.site.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_site_config_resolves() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, SITE_TOML);

    let loaded = LoadedFacts::build(Some(site.as_path()), None, None).unwrap();
    let resolution = resolve_suite(&loaded.facts).unwrap();
    let root = resolution.root().unwrap();

    assert_eq!(root.name, "PredictiveSanitizer-x86_64");
    assert_eq!(root.parallelism_group, "shadow-memory");
    assert!(!root.unsupported);
    // No libdispatch in the site features.
    assert!(resolution.get("libdispatch").unwrap().unsupported);
}

#[test]
fn test_feature_flag_enables_libdispatch() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, SITE_TOML);

    let loaded = LoadedFacts::build(Some(site.as_path()), None, None)
        .unwrap()
        .with_features(["libdispatch"]);
    let resolution = resolve_suite(&loaded.facts).unwrap();
    let libdispatch = resolution.get("libdispatch").unwrap();

    assert!(!libdispatch.unsupported);
    assert!(libdispatch.substitutions.get("%clangxx_psan ").unwrap().ends_with(" -fblocks "));
}

#[test]
fn test_overrides_switch_host() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, SITE_TOML);
    let overrides = parse_overrides(&[
        "host_os=NetBSD".to_string(),
        "netbsd_noaslr_prefix=/usr/sbin/paxctl +a".to_string(),
    ])
    .unwrap();

    let loaded = LoadedFacts::build(Some(site.as_path()), None, overrides).unwrap();
    assert_eq!(loaded.facts.host_os, Some(HostOs::NetBSD));

    let resolution = resolve_suite(&loaded.facts).unwrap();
    let root = resolution.root().unwrap();
    assert_eq!(root.substitutions.position("%run"), Some(0));
    assert_eq!(root.substitutions.get("CHECK-%os"), Some("CHECK-NetBSD"));
}

#[test]
fn test_local_config_overrides_site() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, SITE_TOML);
    let local = dir.path().join("psan.local.toml");
    fs::write(&local, "parallelism_group = \"psan-local\"\ndeflake_threshold = 3\n").unwrap();

    let loaded = LoadedFacts::build(Some(site.as_path()), Some(local.as_path()), None).unwrap();
    let resolution = resolve_suite(&loaded.facts).unwrap();
    let root = resolution.root().unwrap();

    assert_eq!(root.parallelism_group, "psan-local");
    assert_eq!(
        root.substitutions.get("%deflake "),
        Some("/src/compiler-rt/test/psan/deflake.bash 3 ")
    );
}

#[test]
fn test_incomplete_site_config_reports_attribute() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, "host_os = \"Linux\"\ncompiler_id = \"Clang\"\n");

    let loaded = LoadedFacts::build(Some(site.as_path()), None, None).unwrap();
    let err = resolve_suite(&loaded.facts).unwrap_err();
    assert!(err.to_string().contains("'target_arch'"));
    assert_eq!(
        loaded.facts.missing_attributes(),
        vec![
            "target_arch",
            "deflake_threshold",
            "compiler_rt_obj_root",
            "clang",
            "test_source_root",
        ]
    );
}

#[test]
fn test_execution_config_handoff_file() {
    let dir = TempDir::new().unwrap();
    let site = write_site(&dir, SITE_TOML);
    let loaded = LoadedFacts::build(Some(site.as_path()), None, None).unwrap();
    let resolution = resolve_suite(&loaded.facts).unwrap();

    let out = dir.path().join("execution_config.json");
    let root = resolution.root().unwrap();
    root.write_to_file(&out).unwrap();

    let loaded_back = ExecutionConfig::from_file(&out).unwrap();
    assert_eq!(&loaded_back, root);
    assert_eq!(
        loaded_back.substitutions.materialize(),
        root.substitutions.materialize()
    );
}
