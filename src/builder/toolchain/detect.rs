//! Compiler family detection.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::util::process::ProcessBuilder;

use super::{CompilerFamily, ToolchainError};

static CLANG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"clang(\+\+)?(-\d+)?$").unwrap());
static GCC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(gcc|g\+\+)(-\d+)?$").unwrap());
static MSVC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^cl(\.exe)?$").unwrap());

/// Infer the compiler family from the C compiler name, then the C++ one.
///
/// Only the base name is matched, so `/usr/bin/gcc-12` and `C:\VC\bin\cl.exe`
/// are both recognized.
pub fn detect_family(c_compiler: &str, cxx_compiler: &str) -> Result<CompilerFamily, ToolchainError> {
    [c_compiler, cxx_compiler]
        .into_iter()
        .filter(|name| !name.is_empty())
        .find_map(|name| family_of(base_name(name)))
        .ok_or_else(|| ToolchainError::UnknownCompiler {
            c: c_compiler.to_string(),
            cxx: cxx_compiler.to_string(),
        })
}

fn family_of(base: &str) -> Option<CompilerFamily> {
    if CLANG_RE.is_match(base) {
        Some(CompilerFamily::Clang)
    } else if GCC_RE.is_match(base) {
        Some(CompilerFamily::Gcc)
    } else if MSVC_RE.is_match(base) {
        Some(CompilerFamily::Msvc)
    } else {
        None
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether `gcc` really is GCC and not a clang shim (as on macOS).
pub fn gcc_is_real_gcc(compiler: &Path) -> Result<bool> {
    let output = ProcessBuilder::new(compiler).arg("--version").exec_and_check()?;
    let version = String::from_utf8_lossy(&output.stdout).to_lowercase();

    if version.contains("clang") {
        return Ok(false);
    }
    Ok(version.contains("gcc"))
}
