//! Implementation of `cbuild detect-toolchains`.
//!
//! Each candidate compiler pair found on `PATH` is probed by configuring and
//! building a hello-world CMake project with a generated toolchain file.
//! Pairs that pass get a descriptor under `toolchains/<name>/`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::builder::cmake::GENERATOR;
use crate::builder::toolchain::{gcc_is_real_gcc, generate_toolchain_file, GenerateRequest};
use crate::core::system::{Platform, Processor};
use crate::core::toolchain::{GenerateOptions, Toolchain, TOOLCHAIN_FILE};
use crate::core::workspace::Workspace;
use crate::core::host_key;
use crate::util::fs::write_string;
use crate::util::process::{find_executable, CommandRunner, ProcessBuilder};

const PROBE_CMAKELISTS: &str =
    "cmake_minimum_required(VERSION 3.10)\nproject(test)\nadd_executable(test main.cpp)\n";
const PROBE_MAIN: &str = "int main() { return 0; }\n";

/// A compiler pair worth probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub name: &'static str,
    pub c_compiler: &'static str,
    pub cxx_compiler: &'static str,
    pub extra_cxx_flags: &'static [&'static str],
}

impl Candidate {
    fn uses_libcxx(&self) -> bool {
        self.extra_cxx_flags.contains(&"-stdlib=libc++")
    }

    fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            c_compiler: self.c_compiler.to_string(),
            cxx_compiler: self.cxx_compiler.to_string(),
            linker: String::new(),
            extra_cxx_flags: self.extra_cxx_flags.iter().map(|f| f.to_string()).collect(),
        }
    }
}

pub const CANDIDATES: [Candidate; 4] = [
    Candidate {
        name: "system-gcc",
        c_compiler: "gcc",
        cxx_compiler: "g++",
        extra_cxx_flags: &[],
    },
    Candidate {
        name: "system-clang",
        c_compiler: "clang",
        cxx_compiler: "clang++",
        extra_cxx_flags: &[],
    },
    Candidate {
        name: "system-clang-libcxx",
        c_compiler: "clang",
        cxx_compiler: "clang++",
        extra_cxx_flags: &["-stdlib=libc++"],
    },
    Candidate {
        name: "system-gcc-libcxx",
        c_compiler: "gcc",
        cxx_compiler: "g++",
        extra_cxx_flags: &["-stdlib=libc++"],
    },
];

/// Candidates that make sense on `platform`. macOS has no libc++ variants;
/// its system compiler already uses it.
pub fn candidates_for(platform: Platform) -> Vec<Candidate> {
    CANDIDATES
        .iter()
        .filter(|c| !(platform == Platform::Mac && c.uses_libcxx()))
        .copied()
        .collect()
}

/// Configure and build a hello-world project in `dir` with `options`.
///
/// Returns false if either step fails.
pub fn probe_toolchain(
    cmake: &str,
    options: &GenerateOptions,
    platform: Platform,
    processor: Processor,
    dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<bool> {
    write_string(&dir.join("CMakeLists.txt"), PROBE_CMAKELISTS)?;
    write_string(&dir.join("main.cpp"), PROBE_MAIN)?;

    let toolchain_file = dir.join("toolchain.cmake");
    let req = GenerateRequest::new(options, platform, processor, dir);
    generate_toolchain_file(&req, &toolchain_file)?;

    let build_dir = dir.join("build");
    let configure = ProcessBuilder::new(cmake)
        .arg("-S")
        .arg(dir)
        .arg("-B")
        .arg(&build_dir)
        .args(["-G", GENERATOR])
        .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain_file.display()));
    if let Err(e) = runner.run(&configure) {
        tracing::debug!("configure failed: {:#}", e);
        return Ok(false);
    }

    let build = ProcessBuilder::new(cmake).arg("--build").arg(&build_dir);
    if let Err(e) = runner.run(&build) {
        tracing::debug!("build failed: {:#}", e);
        return Ok(false);
    }

    Ok(true)
}

fn on_path(candidate: &Candidate) -> bool {
    let Some(cc) = find_executable(candidate.c_compiler) else {
        return false;
    };
    if find_executable(candidate.cxx_compiler).is_none() {
        return false;
    }
    if candidate.c_compiler == "gcc" {
        return gcc_is_real_gcc(&cc).unwrap_or(false);
    }
    true
}

/// Probe every candidate and write descriptors for the ones that work.
///
/// Returns the names of the toolchains written.
pub fn detect_toolchains(ws: &Workspace, runner: &dyn CommandRunner) -> Result<Vec<String>> {
    let platform = Platform::host().context("unsupported host platform")?;
    let processor = Processor::host().context("unsupported host processor")?;

    let mut found = Vec::new();
    for candidate in candidates_for(platform) {
        if !on_path(&candidate) {
            tracing::debug!("skipping {}: compilers not found", candidate.name);
            continue;
        }

        tracing::info!("Probing {}", candidate.name);
        let options = candidate.generate_options();
        let tmp = tempfile::TempDir::new().context("failed to create probe directory")?;
        if !probe_toolchain(ws.cmake_binary(), &options, platform, processor, tmp.path(), runner)? {
            tracing::info!("{} does not work, skipping", candidate.name);
            continue;
        }

        let path = ws.toolchains_dir().join(candidate.name).join(TOOLCHAIN_FILE);
        Toolchain::generated(platform, processor, host_key(), options)
            .write(&path)
            .with_context(|| format!("failed to write toolchain `{}`", candidate.name))?;
        found.push(candidate.name.to_string());
    }

    Ok(found)
}
