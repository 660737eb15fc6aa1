//! Implementation of `cbuild build` and `cbuild build-deps`.
//!
//! Every (toolchain, configuration) pair gets its own `BuildDriver`. The
//! driver walks the dependency graph depth-first, so building a target
//! always builds what it depends on first.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::builder::cmake::{configure_args, CMake};
use crate::builder::context::BuildParameters;
use crate::builder::toolchain::{generate_toolchain_file, GenerateRequest};
use crate::core::target::{split_dependency, TargetContext};
use crate::core::toolchain::LoadedToolchain;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::core::host_key;
use crate::util::process::CommandRunner;

/// Toolchain selection meaning "every toolchain in the workspace".
pub const ALL_TOOLCHAINS: &str = "all";

/// What to build in each (toolchain, configuration) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildMode {
    /// Every target in the workspace.
    All,
    /// One target and everything it depends on.
    Target(String),
    /// The direct dependencies of a target, but not the target itself.
    Dependencies(String),
}

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Toolchain name, or `all`.
    pub toolchain: String,

    /// Configurations to build; empty means the workspace's list.
    pub configurations: Vec<String>,

    pub mode: BuildMode,

    pub dry_run: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            toolchain: ALL_TOOLCHAINS.to_string(),
            configurations: Vec::new(),
            mode: BuildMode::All,
            dry_run: false,
        }
    }
}

/// Expand a toolchain selection into toolchain names.
pub fn resolve_toolchains(ws: &Workspace, selection: &str) -> Result<Vec<String>> {
    if !selection.is_empty() && selection != ALL_TOOLCHAINS {
        return Ok(vec![selection.to_string()]);
    }

    let names = ws.toolchain_names()?;
    if names.is_empty() {
        bail!(
            "no toolchains found in {}\n\
             hint: run `cbuild detect-toolchains` or create toolchains/<name>/toolchain.yml",
            ws.toolchains_dir().display()
        );
    }
    Ok(names)
}

/// The configurations to build: the requested ones, else the workspace's.
pub fn resolve_configurations(ws: &Workspace, requested: &[String]) -> Vec<String> {
    let requested: Vec<String> = requested
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if requested.is_empty() {
        ws.configurations()
    } else {
        requested
    }
}

/// Run a build over every selected toolchain and configuration.
pub fn build(ws: &Workspace, opts: &BuildOptions, runner: &dyn CommandRunner) -> Result<()> {
    let toolchains = resolve_toolchains(ws, &opts.toolchain)?;
    let configurations = resolve_configurations(ws, &opts.configurations);

    for toolchain in &toolchains {
        for configuration in &configurations {
            let bp = BuildParameters::new(toolchain.as_str(), configuration.as_str())
                .with_dry_run(opts.dry_run);
            tracing::debug!("build pass {}", bp);

            let mut driver = BuildDriver::prebuild(ws, bp, runner)?;
            match &opts.mode {
                BuildMode::All => driver.build_all()?,
                BuildMode::Target(name) => driver.build_target(name)?,
                BuildMode::Dependencies(name) => driver.build_deps(name)?,
            }
        }
    }

    Ok(())
}

/// Resolve the toolchain file for `name` on this host, generating it first
/// when the descriptor asks for that.
///
/// No entry for the host means CMake runs without a toolchain file.
pub fn prepare_toolchain(ws: &Workspace, name: &str) -> Result<Option<PathBuf>> {
    let loaded = LoadedToolchain::load(ws, name)?;
    let host = host_key();

    let Some(entry) = loaded.toolchain.for_host(&host) else {
        tracing::warn!(
            "toolchain `{}` has no entry for {}; configuring without a toolchain file",
            name,
            host
        );
        return Ok(None);
    };

    if let Some(ref generate) = entry.generate {
        let output = LoadedToolchain::generated_file(ws, name);
        let req = GenerateRequest::new(
            generate,
            loaded.toolchain.target_system,
            loaded.toolchain.target_arch,
            ws.root(),
        );
        generate_toolchain_file(&req, &output)
            .with_context(|| format!("failed to generate toolchain file for `{}`", name))?;
    } else if entry.cmake_toolchain_file.is_empty() {
        return Ok(None);
    }

    Ok(loaded.toolchain_file(ws, &host))
}

/// Drives one (toolchain, configuration) pass.
pub struct BuildDriver<'a> {
    ws: &'a Workspace,
    bp: BuildParameters,
    cmake: CMake<'a>,
    toolchain_file: Option<PathBuf>,
    built: HashSet<String>,
    in_progress: Vec<String>,
}

impl<'a> BuildDriver<'a> {
    /// Load the toolchain and set up a driver for `bp`.
    pub fn prebuild(
        ws: &'a Workspace,
        bp: BuildParameters,
        runner: &'a dyn CommandRunner,
    ) -> Result<Self> {
        let toolchain_file = prepare_toolchain(ws, &bp.toolchain)?;
        Ok(Self::with_toolchain_file(ws, bp, runner, toolchain_file))
    }

    pub fn with_toolchain_file(
        ws: &'a Workspace,
        bp: BuildParameters,
        runner: &'a dyn CommandRunner,
        toolchain_file: Option<PathBuf>,
    ) -> Self {
        let cmake = CMake::new(ws.cmake_binary(), runner, bp.dry_run);
        BuildDriver {
            ws,
            bp,
            cmake,
            toolchain_file,
            built: HashSet::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn toolchain_file(&self) -> Option<&std::path::Path> {
        self.toolchain_file.as_deref()
    }

    /// Whether `name` has been built during this pass.
    pub fn is_built(&self, name: &str) -> bool {
        self.built.contains(name)
    }

    /// Build every target, in name order.
    pub fn build_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.ws.config.targets.keys().cloned().collect();
        for name in names {
            self.build_target(&name)?;
        }
        Ok(())
    }

    /// Build the direct dependencies of `name` (and theirs), not `name` itself.
    pub fn build_deps(&mut self, name: &str) -> Result<()> {
        let target = self.ws.target(name)?;
        for dep in &target.config.depends {
            let (dep_name, _) = split_dependency(dep);
            self.build_target(dep_name)
                .with_context(|| format!("failed to build dependency {}", dep_name))?;
        }
        Ok(())
    }

    /// Build `name` after its dependencies. A target is built at most once
    /// per driver.
    pub fn build_target(&mut self, name: &str) -> Result<()> {
        if self.built.contains(name) {
            return Ok(());
        }

        if let Some(pos) = self.in_progress.iter().position(|n| n == name) {
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(name.to_string());
            return Err(WorkspaceError::DependencyCycle { chain }.into());
        }

        let target = self.ws.target(name)?;

        self.in_progress.push(name.to_string());
        let result = self.build_with_deps(&target);
        self.in_progress.pop();
        result?;

        self.built.insert(name.to_string());
        Ok(())
    }

    fn build_with_deps(&mut self, target: &TargetContext) -> Result<()> {
        for dep in &target.config.depends {
            let (dep_name, _) = split_dependency(dep);
            self.build_target(dep_name)
                .with_context(|| format!("failed to build dependency {}", dep_name))?;
        }
        self.build_single(target)
    }

    fn build_single(&self, target: &TargetContext) -> Result<()> {
        target
            .config
            .check_project_type()
            .with_context(|| format!("failed to configure module {}", target.name))?;

        tracing::info!("Building {} ({})", target.name, self.bp);

        let args = configure_args(self.ws, target, &self.bp, self.toolchain_file.as_deref())
            .with_context(|| format!("failed to configure module {}", target.name))?;
        self.cmake
            .configure(&args)
            .with_context(|| format!("failed to configure module {}", target.name))?;

        let build_dir = target.build_path(self.ws, &self.bp);
        self.cmake
            .build(&build_dir, &self.bp.configuration)
            .with_context(|| format!("failed to build module {}", target.name))?;

        if target.config.is_staged() {
            let prefix = target.staging_path(self.ws, &self.bp);
            self.cmake
                .install(&build_dir, &prefix, &self.bp.configuration)
                .with_context(|| format!("failed to install module {}", target.name))?;
        }

        Ok(())
    }
}
