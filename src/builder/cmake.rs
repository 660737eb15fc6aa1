//! CMake invocation for workspace targets.
//!
//! Computes the configure command line for a target (including what each
//! dependency contributes) and runs configure, build, and install steps.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::context::BuildParameters;
use crate::core::target::{split_dependency, TargetContext};
use crate::core::workspace::Workspace;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Generator passed to every configure step.
pub const GENERATOR: &str = "Ninja";

/// What a dependency contributes to a consumer's configure command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyArgs {
    /// A staged dependency contributes its install prefix, which the consumer
    /// folds into `CMAKE_PREFIX_PATH` and `CMAKE_MODULE_PATH`.
    Staged(PathBuf),

    /// `-D<Package>_DIR=...` and, optionally, `-D<ALIAS>_ROOT=...`.
    Direct(Vec<String>),
}

/// Arguments a consumer needs to find `dep`.
pub fn dependency_args(ws: &Workspace, dep: &TargetContext, bp: &BuildParameters) -> DependencyArgs {
    if dep.config.is_staged() {
        return DependencyArgs::Staged(dep.staging_path(ws, bp));
    }

    let mut args = vec![format!(
        "-D{}_DIR={}",
        dep.package_name(),
        dep.config_path(ws, bp).display()
    )];

    if let Some(alias) = dep.config.find_package_root.as_deref() {
        args.push(format!("-D{}_ROOT={}", alias, dep.source_path(ws).display()));
    }

    DependencyArgs::Direct(args)
}

/// The full configure command line for `target`, without the program name.
pub fn configure_args(
    ws: &Workspace,
    target: &TargetContext,
    bp: &BuildParameters,
    toolchain_file: Option<&Path>,
) -> Result<Vec<String>> {
    let mut args = vec![
        "-S".to_string(),
        target.source_path(ws).display().to_string(),
        "-B".to_string(),
        target.build_path(ws, bp).display().to_string(),
        "-G".to_string(),
        GENERATOR.to_string(),
        format!("-DCMAKE_BUILD_TYPE={}", bp.configuration),
    ];

    let cxx_standard = target
        .config
        .cxx_standard
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(ws.config.cxx_version.as_str());
    if !cxx_standard.is_empty() {
        args.push(format!("-DCMAKE_CXX_STANDARD={}", cxx_standard));
    }

    if let Some(file) = toolchain_file {
        args.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", file.display()));
    }

    let mut staged = Vec::new();
    let mut direct = Vec::new();
    for dep in &target.config.depends {
        let (name, _) = split_dependency(dep);
        let dep_target = ws
            .target(name)
            .with_context(|| format!("target `{}` depends on `{}`", target.name, dep))?;

        match dependency_args(ws, &dep_target, bp) {
            DependencyArgs::Staged(path) => staged.push(path.display().to_string()),
            DependencyArgs::Direct(dep_args) => direct.extend(dep_args),
        }
    }

    let prefix = staged.join(";");
    args.push(format!("-DCMAKE_PREFIX_PATH={}", prefix));
    args.push(format!("-DCMAKE_MODULE_PATH={}", prefix));
    args.extend(direct);

    args.extend(target.config.extra_cmake_configure_args.iter().cloned());
    args.extend(
        target
            .config
            .cmake_options
            .iter()
            .map(|(name, option)| option.to_define(name)),
    );

    Ok(args)
}

/// Drop the `-S <path>` and `-B <path>` pairs from a configure command line.
pub fn strip_source_and_build(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-S" || arg == "-B" {
            iter.next();
            continue;
        }
        out.push(arg.clone());
    }
    out
}

/// Runs CMake steps for one workspace, honoring dry-run.
pub struct CMake<'a> {
    binary: PathBuf,
    runner: &'a dyn CommandRunner,
    dry_run: bool,
}

impl<'a> CMake<'a> {
    pub fn new(binary: impl Into<PathBuf>, runner: &'a dyn CommandRunner, dry_run: bool) -> Self {
        CMake {
            binary: binary.into(),
            runner,
            dry_run,
        }
    }

    /// Run `cmake <args>`, or only log it in dry-run mode.
    pub fn exec(&self, args: &[String]) -> Result<()> {
        let cmd = ProcessBuilder::new(&self.binary).args(args);
        if self.dry_run {
            tracing::info!("dry-run: {}", cmd.display_command());
            return Ok(());
        }

        tracing::info!("Executing: {}", cmd.display_command());
        self.runner.run(&cmd)
    }

    pub fn configure(&self, args: &[String]) -> Result<()> {
        self.exec(args)
    }

    /// `cmake --build <dir> --config <cfg>`
    pub fn build(&self, build_dir: &Path, configuration: &str) -> Result<()> {
        self.exec(&[
            "--build".to_string(),
            build_dir.display().to_string(),
            "--config".to_string(),
            configuration.to_string(),
        ])
    }

    /// `cmake --install <dir> --prefix <prefix> --config <cfg>`
    pub fn install(&self, build_dir: &Path, prefix: &Path, configuration: &str) -> Result<()> {
        self.exec(&[
            "--install".to_string(),
            build_dir.display().to_string(),
            "--prefix".to_string(),
            prefix.display().to_string(),
            "--config".to_string(),
            configuration.to_string(),
        ])
    }
}
