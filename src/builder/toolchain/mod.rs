//! CMake toolchain-file generation.
//!
//! A toolchain file pins the compilers, the target system, and a fixed
//! catalog of build presets with per-family compiler flags. Generation is a
//! pure function of its inputs apart from the debug prefix map, which embeds
//! the absolute workspace path.
//!
//! Flag vocabularies live in [`gcc`] (GCC and Clang) and [`msvc`].

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::system::{Platform, Processor};
use crate::core::toolchain::GenerateOptions;
use crate::util::fs::write_string;

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_family, gcc_is_real_gcc};
pub use gcc::GccFlags;
pub use msvc::MsvcFlags;

/// Errors raised before a toolchain file is written.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("unknown compiler: cannot infer a compiler family from `{c}` / `{cxx}`")]
    UnknownCompiler { c: String, cxx: String },

    #[error("unsupported platform/processor combination: {platform}/{processor}")]
    UnsupportedProcessor {
        platform: Platform,
        processor: Processor,
    },
}

/// Compiler family, which selects the flag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFamily {
    Gcc,
    Clang,
    Msvc,
}

impl CompilerFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::Msvc => "msvc",
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named configuration registered with CMake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPreset {
    Debug,
    Release,
    RelWithDebInfo,
    Quick,
    Profile,
    DebugCoverage,
    DebugAsan,
    DebugTsan,
    ReleaseAsan,
    ReleaseTsan,
}

impl BuildPreset {
    /// Presets every family supports, in registration order.
    pub const BASE: [BuildPreset; 5] = [
        BuildPreset::Debug,
        BuildPreset::Release,
        BuildPreset::RelWithDebInfo,
        BuildPreset::Quick,
        BuildPreset::Profile,
    ];

    /// Every preset, in registration order.
    pub const ALL: [BuildPreset; 10] = [
        BuildPreset::Debug,
        BuildPreset::Release,
        BuildPreset::RelWithDebInfo,
        BuildPreset::Quick,
        BuildPreset::Profile,
        BuildPreset::DebugCoverage,
        BuildPreset::DebugAsan,
        BuildPreset::DebugTsan,
        BuildPreset::ReleaseAsan,
        BuildPreset::ReleaseTsan,
    ];

    /// The configuration name as CMake sees it.
    pub fn name(&self) -> &'static str {
        match self {
            BuildPreset::Debug => "Debug",
            BuildPreset::Release => "Release",
            BuildPreset::RelWithDebInfo => "RelWithDebInfo",
            BuildPreset::Quick => "Quick",
            BuildPreset::Profile => "Profile",
            BuildPreset::DebugCoverage => "DebugCoverage",
            BuildPreset::DebugAsan => "DebugASAN",
            BuildPreset::DebugTsan => "DebugTSAN",
            BuildPreset::ReleaseAsan => "ReleaseASAN",
            BuildPreset::ReleaseTsan => "ReleaseTSAN",
        }
    }
}

/// Per-family flag vocabulary.
pub trait PresetFlags {
    /// Presets registered in `CMAKE_CONFIGURATION_TYPES`.
    fn supported_presets(&self) -> &'static [BuildPreset];

    /// Compiler flags for one preset.
    fn preset_flags(&self, preset: BuildPreset) -> Vec<String>;
}

/// Everything needed to render a toolchain file.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub c_compiler: String,
    pub cxx_compiler: String,
    pub linker: String,
    pub extra_cxx_flags: Vec<String>,
    /// Inferred from the compiler names when absent.
    pub family: Option<CompilerFamily>,
    pub platform: Platform,
    pub processor: Processor,
    /// Absolute path remapped to `.` in debug info.
    pub workspace_dir: PathBuf,
}

impl GenerateRequest {
    pub fn new(
        options: &GenerateOptions,
        platform: Platform,
        processor: Processor,
        workspace_dir: &Path,
    ) -> Self {
        GenerateRequest {
            c_compiler: options.c_compiler.clone(),
            cxx_compiler: options.cxx_compiler.clone(),
            linker: options.linker.clone(),
            extra_cxx_flags: options.extra_cxx_flags.clone(),
            family: None,
            platform,
            processor,
            workspace_dir: std::path::absolute(workspace_dir)
                .unwrap_or_else(|_| workspace_dir.to_path_buf()),
        }
    }

    pub fn resolve_family(&self) -> Result<CompilerFamily, ToolchainError> {
        match self.family {
            Some(family) => Ok(family),
            None => detect_family(&self.c_compiler, &self.cxx_compiler),
        }
    }
}

/// `CMAKE_SYSTEM_NAME` for a platform.
pub fn cmake_system_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Mac => "Darwin",
        Platform::Linux => "Linux",
        Platform::FreeBSD => "FreeBSD",
        Platform::Windows => "Windows",
    }
}

/// `CMAKE_SYSTEM_PROCESSOR` for a platform/processor pair.
pub fn cmake_system_processor(
    platform: Platform,
    processor: Processor,
) -> Result<&'static str, ToolchainError> {
    let name = match (platform, processor) {
        (Platform::Linux, Processor::X86) => "i686",
        (Platform::FreeBSD, Processor::X86) => "i386",
        (Platform::Linux, Processor::X64) => "x86_64",
        (Platform::FreeBSD, Processor::X64) => "amd64",
        (Platform::Linux | Platform::FreeBSD, Processor::Arm32) => "armv7l",
        (Platform::Linux | Platform::FreeBSD, Processor::Arm64) => "aarch64",
        (Platform::Linux | Platform::FreeBSD, Processor::RiscV32) => "riscv32",
        (Platform::Linux | Platform::FreeBSD, Processor::RiscV64) => "riscv64",

        (Platform::Mac, Processor::X64) => "x86_64",
        (Platform::Mac, Processor::Arm64) => "arm64",

        (Platform::Windows, Processor::X86) => "x86",
        (Platform::Windows, Processor::X64) => "AMD64",
        (Platform::Windows, Processor::Arm32) => "ARM",
        (Platform::Windows, Processor::Arm64) => "ARM64",

        _ => {
            return Err(ToolchainError::UnsupportedProcessor {
                platform,
                processor,
            })
        }
    };
    Ok(name)
}

/// Render the toolchain file contents.
pub fn render_toolchain_file(req: &GenerateRequest) -> Result<String, ToolchainError> {
    let family = req.resolve_family()?;
    let system_name = cmake_system_name(req.platform);
    let system_processor = cmake_system_processor(req.platform, req.processor)?;

    let flags: Box<dyn PresetFlags> = match family {
        CompilerFamily::Gcc | CompilerFamily::Clang => {
            Box::new(GccFlags::new(family == CompilerFamily::Clang, &req.workspace_dir))
        }
        CompilerFamily::Msvc => Box::new(MsvcFlags),
    };

    let mut out = String::from("# Automatically generated toolchain file\n");
    set(&mut out, "CMAKE_SYSTEM_NAME", system_name);
    set(&mut out, "CMAKE_SYSTEM_PROCESSOR", system_processor);

    for (var, value) in [
        ("CMAKE_C_COMPILER", &req.c_compiler),
        ("CMAKE_CXX_COMPILER", &req.cxx_compiler),
        ("CMAKE_LINKER", &req.linker),
    ] {
        if !value.is_empty() {
            set(&mut out, var, value);
        }
    }

    set(&mut out, "CMAKE_C_FLAGS_INIT", "");
    set(&mut out, "CMAKE_CXX_FLAGS_INIT", &req.extra_cxx_flags.join(" "));

    let presets = flags.supported_presets();
    let names: Vec<&str> = presets.iter().map(BuildPreset::name).collect();
    out.push_str(&format!(
        "set(CMAKE_CONFIGURATION_TYPES {} CACHE STRING \"\" FORCE)\n",
        quote(&names.join(";"))
    ));

    for preset in presets {
        let upper = preset.name().to_uppercase();
        let joined = flags.preset_flags(*preset).join(" ");
        set(&mut out, &format!("CMAKE_CXX_FLAGS_{}_INIT", upper), &joined);
        set(&mut out, &format!("CMAKE_C_FLAGS_{}_INIT", upper), &joined);
    }

    out.push_str("set(CMAKE_FIND_ROOT_PATH_MODE_PACKAGE NEVER)\n");
    Ok(out)
}

/// Render and write a toolchain file, creating parent directories.
pub fn generate_toolchain_file(req: &GenerateRequest, output: &Path) -> Result<()> {
    let contents = render_toolchain_file(req)?;
    tracing::debug!(
        "generating toolchain file {} for {}/{}",
        output.display(),
        req.platform,
        req.processor
    );
    write_string(output, &contents)
        .with_context(|| format!("failed to write toolchain file {}", output.display()))
}

fn set(out: &mut String, var: &str, value: &str) {
    out.push_str(&format!("set({} {})\n", var, quote(value)));
}

/// Quote a value as a CMake bracket-free string argument.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
