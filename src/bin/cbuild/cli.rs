//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cbuild::ops::ALL_TOOLCHAINS;
use cbuild::util::ColorChoice;

/// cbuild - a meta-build orchestrator for CMake workspaces
#[derive(Parser)]
#[command(name = "cbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Workspace root (defaults to the nearest directory holding cbuild_workspace.yml)
    #[arg(short, long, global = true, env = "CBUILD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty workspace
    Init(InitArgs),

    /// Build targets and their dependencies
    Build(BuildArgs),

    /// Build the dependencies of a target, but not the target itself
    BuildDeps(BuildDepsArgs),

    /// Remove build trees
    Clean(CleanArgs),

    /// Add a git repository as a source and create its target
    GitClone(GitCloneArgs),

    /// Fetch one source, or every source not yet on disk
    Download(DownloadArgs),

    /// Apply a source's manifest to its targets
    LoadDefaults(LoadDefaultsArgs),

    /// Add a dependency to a target
    AddDependency(DependencyArgs),

    /// Remove a dependency from a target
    RemoveDependency(DependencyArgs),

    /// Forget a source
    RemoveSource(RemoveSourceArgs),

    /// Remove a target
    RemoveTarget(NameArgs),

    /// Remove a source and every target built from it
    RemoveProject(RemoveSourceArgs),

    /// Delete a source's files but keep it in the workspace
    DropFiles(NameArgs),

    /// Set the C++ standard of a target, or the workspace default
    SetCxxVersion(SetCxxVersionArgs),

    /// Install a target into its staging prefix after building it
    EnableStaging(NameArgs),

    /// Stop staging a target
    DisableStaging(NameArgs),

    /// Add a build configuration
    AddConfig(NameArgs),

    /// Remove a build configuration
    RemoveConfig(NameArgs),

    /// Show the state of every target's source
    ListSources,

    /// Print the CMake configure arguments of a target
    GetArgs(GetArgsArgs),

    /// Find working system compilers and write toolchains for them
    DetectToolchains,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Overwrite an existing workspace, deleting toolchains, sources, and build trees
    #[arg(long)]
    pub reinit: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Toolchain to build with, or `all`
    #[arg(short = 'T', long, default_value = ALL_TOOLCHAINS)]
    pub toolchain: String,

    /// Comma-separated configurations (defaults to the workspace's list)
    #[arg(short, long = "config", value_delimiter = ',')]
    pub configs: Vec<String>,

    /// Build only this target (and its dependencies)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Print commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct BuildDepsArgs {
    /// Target whose dependencies to build
    #[arg(short, long)]
    pub target: String,

    #[arg(short = 'T', long, default_value = ALL_TOOLCHAINS)]
    pub toolchain: String,

    #[arg(short, long = "config", value_delimiter = ',')]
    pub configs: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    #[arg(short = 'T', long, default_value = ALL_TOOLCHAINS)]
    pub toolchain: String,

    /// Comma-separated configurations (defaults to every configuration)
    #[arg(short, long = "config", value_delimiter = ',')]
    pub configs: Vec<String>,

    /// Print what would be removed
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct FetchFlags {
    /// Download suggested dependencies without asking
    #[arg(long)]
    pub download_deps: bool,

    /// Add git sources as submodules of the workspace repository
    #[arg(long)]
    pub submodule: bool,
}

#[derive(Args)]
pub struct GitCloneArgs {
    /// Repository URL
    pub url: String,

    /// Source name (defaults to the repository name)
    pub name: Option<String>,

    /// Revision to check out
    #[arg(short, long)]
    pub revision: Option<String>,

    /// Don't apply the source's manifest
    #[arg(long)]
    pub no_setup: bool,

    #[command(flatten)]
    pub fetch: FetchFlags,
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Source to fetch (defaults to every missing source)
    pub source: Option<String>,

    #[arg(long)]
    pub no_setup: bool,

    #[command(flatten)]
    pub fetch: FetchFlags,
}

#[derive(Args)]
pub struct LoadDefaultsArgs {
    pub source: String,

    #[command(flatten)]
    pub fetch: FetchFlags,
}

#[derive(Args)]
pub struct DependencyArgs {
    pub target: String,
    pub dependency: String,
}

#[derive(Args)]
pub struct RemoveSourceArgs {
    pub source: String,

    /// Also delete sources/<source>
    #[arg(short = 'D', long)]
    pub delete: bool,
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args)]
pub struct SetCxxVersionArgs {
    /// C++ standard, e.g. 17
    pub version: String,

    /// Target to set it on (defaults to the workspace default)
    pub target: Option<String>,
}

#[derive(Args)]
pub struct GetArgsArgs {
    pub target: String,

    #[arg(short = 'T', long, default_value = cbuild::ops::get_args::DEFAULT_TOOLCHAIN)]
    pub toolchain: String,

    #[arg(short, long = "config", default_value = cbuild::ops::get_args::DEFAULT_CONFIGURATION)]
    pub config: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
