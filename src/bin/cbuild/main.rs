//! cbuild CLI - a meta-build orchestrator for CMake workspaces

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cbuild::core::find_workspace_root;
use cbuild::util::Shell;
use cbuild::Workspace;
use cli::{Cli, Commands};

/// Options every command gets.
pub struct GlobalOptions {
    pub shell: Shell,
    workspace: Option<PathBuf>,
}

impl GlobalOptions {
    /// `-w` if given, else the nearest ancestor holding a workspace file,
    /// else the current directory.
    pub fn workspace_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.workspace {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Ok(find_workspace_root(&cwd).unwrap_or(cwd))
    }

    pub fn load_workspace(&self) -> Result<Workspace> {
        Workspace::load(self.workspace_root()?)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cbuild=debug")
    } else if cli.quiet {
        EnvFilter::new("cbuild=warn")
    } else {
        EnvFilter::new("cbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let opts = GlobalOptions {
        shell: Shell::from_flags(cli.quiet, cli.verbose, cli.color),
        workspace: cli.workspace,
    };

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &opts),
        Commands::Build(args) => commands::build::execute(args, &opts),
        Commands::BuildDeps(args) => commands::build::execute_deps(args, &opts),
        Commands::Clean(args) => commands::clean::execute(args, &opts),
        Commands::GitClone(args) => commands::fetch::git_clone(args, &opts),
        Commands::Download(args) => commands::fetch::download(args, &opts),
        Commands::LoadDefaults(args) => commands::fetch::load_defaults(args, &opts),
        Commands::AddDependency(args) => commands::edit::add_dependency(args, &opts),
        Commands::RemoveDependency(args) => commands::edit::remove_dependency(args, &opts),
        Commands::RemoveSource(args) => commands::edit::remove_source(args, &opts),
        Commands::RemoveTarget(args) => commands::edit::remove_target(args, &opts),
        Commands::RemoveProject(args) => commands::edit::remove_project(args, &opts),
        Commands::DropFiles(args) => commands::edit::drop_files(args, &opts),
        Commands::SetCxxVersion(args) => commands::edit::set_cxx_version(args, &opts),
        Commands::EnableStaging(args) => commands::edit::set_staging(args, true, &opts),
        Commands::DisableStaging(args) => commands::edit::set_staging(args, false, &opts),
        Commands::AddConfig(args) => commands::edit::add_config(args, &opts),
        Commands::RemoveConfig(args) => commands::edit::remove_config(args, &opts),
        Commands::ListSources => commands::list_sources::execute(&opts),
        Commands::GetArgs(args) => commands::get_args::execute(args, &opts),
        Commands::DetectToolchains => commands::detect_toolchains::execute(&opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
