//! Compiler invocation substitutions
//!
//! Builds the macro tokens tests use to compile and run themselves:
//! `%clang_psan `, `%clangxx_psan `, `%link_libcxx_psan`, `CHECK-%os`,
//! `%deflake ` and, on NetBSD, `%run`.

use psan_contract::SubstitutionTable;
use std::path::Path;

use crate::error::ResolveError;
use crate::facts::{required, CompilerId, HostOs, SuiteFacts};

pub const CLANG_TEMPLATE: &str = "%clang_psan ";
pub const CLANGXX_TEMPLATE: &str = "%clangxx_psan ";
pub const LINK_LIBCXX_TEMPLATE: &str = "%link_libcxx_psan";
pub const CHECK_OS_TEMPLATE: &str = "CHECK-%os";
pub const DEFLAKE_TEMPLATE: &str = "%deflake ";
pub const RUN_TEMPLATE: &str = "%run";

/// Flags every psan compile starts with
const SANITIZE_FLAGS: &[&str] = &["-fsanitize=predict", "-Wall"];

/// The GCC driver does not add these with -fsanitize=predict
const GNU_EXTRA_FLAGS: &[&str] = &["-fPIE", "-pthread", "-ldl", "-lrt", "-pie"];

const CXX_STANDARD_FLAG: &str = "-std=c++11";

/// Locations inside an instrumented libc++ build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedLibcxx {
    pub root: String,
    pub include_dir: String,
    pub lib_dir: String,
    pub archive: String,
}

impl InstrumentedLibcxx {
    /// `<obj_root>/lib/psan/libcxx_psan_<arch>`
    pub fn locate(obj_root: &str, target_arch: &str) -> Self {
        let root = Path::new(obj_root)
            .join("lib")
            .join("psan")
            .join(format!("libcxx_psan_{}", target_arch));
        let include_dir = root.join("include").join("c++").join("v1");
        let lib_dir = root.join("lib");
        let archive = lib_dir.join("libc++.a");

        Self {
            root: root.to_string_lossy().to_string(),
            include_dir: include_dir.to_string_lossy().to_string(),
            lib_dir: lib_dir.to_string_lossy().to_string(),
            archive: archive.to_string_lossy().to_string(),
        }
    }
}

/// Resolved C and C++ compile flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFlags {
    pub c: Vec<String>,
    pub cxx: Vec<String>,
    /// Instrumented libc++ in use, if any
    pub libcxx: Option<InstrumentedLibcxx>,
}

impl CompileFlags {
    pub fn resolve(facts: &SuiteFacts) -> Self {
        let include_dir = format!("-I{}/../", facts.test_source_root);

        let mut c: Vec<String> = SANITIZE_FLAGS.iter().map(|s| s.to_string()).collect();
        if !facts.target_cflags.is_empty() {
            c.push(facts.target_cflags.clone());
        }
        c.extend(facts.debug_info_flags.iter().cloned());
        if facts.compiler_id == CompilerId::Gnu {
            c.extend(GNU_EXTRA_FLAGS.iter().map(|s| s.to_string()));
        }
        c.push(include_dir.clone());

        let mut cxx = facts.cxx_mode_flags.clone();
        cxx.extend(c.iter().cloned());
        cxx.push(CXX_STANDARD_FLAG.to_string());
        cxx.push(include_dir);

        // Instrumented libc++ is not supported on Darwin.
        let libcxx = if facts.has_libcxx && facts.host_os != HostOs::Darwin {
            let libcxx = InstrumentedLibcxx::locate(&facts.compiler_rt_obj_root, &facts.target_arch);
            cxx.push("-nostdinc++".to_string());
            cxx.push(format!("-I{}", libcxx.include_dir));
            Some(libcxx)
        } else {
            None
        };

        Self { c, cxx, libcxx }
    }
}

/// `" <compiler> <flags...> "`; the surrounding spaces keep the expansion
/// separated from neighbouring words in the command line.
pub fn build_invocation(compiler: &str, flags: &[String]) -> String {
    let mut words = Vec::with_capacity(flags.len() + 1);
    words.push(compiler);
    words.extend(flags.iter().map(String::as_str));
    format!(" {} ", words.join(" "))
}

/// Register the compiler, OS-check, deflake and run-prefix macros.
pub fn register_substitutions(
    facts: &SuiteFacts,
    table: &mut SubstitutionTable,
) -> Result<CompileFlags, ResolveError> {
    let flags = CompileFlags::resolve(facts);

    let archive = flags
        .libcxx
        .as_ref()
        .map(|l| l.archive.clone())
        .unwrap_or_default();
    table.insert(LINK_LIBCXX_TEMPLATE, archive)?;

    table.insert(CLANG_TEMPLATE, build_invocation(&facts.clang, &flags.c))?;
    table.insert(CLANGXX_TEMPLATE, build_invocation(&facts.clang, &flags.cxx))?;

    table.insert(CHECK_OS_TEMPLATE, format!("CHECK-{}", facts.host_os))?;

    table.insert(
        DEFLAKE_TEMPLATE,
        format!("{} {} ", facts.deflake_script, facts.deflake_threshold),
    )?;

    if facts.host_os == HostOs::NetBSD {
        let prefix = required("netbsd_noaslr_prefix", facts.netbsd_noaslr_prefix.as_ref())?;
        table.insert_front(RUN_TEMPLATE, prefix.clone())?;
    }

    tracing::debug!(
        c_flags = flags.c.len(),
        cxx_flags = flags.cxx.len(),
        libcxx = flags.libcxx.is_some(),
        "registered compiler substitutions"
    );
    Ok(flags)
}
