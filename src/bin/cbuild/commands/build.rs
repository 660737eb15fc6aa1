//! `cbuild build` and `cbuild build-deps` commands

use anyhow::Result;

use crate::cli::{BuildArgs, BuildDepsArgs};
use crate::GlobalOptions;
use cbuild::ops::{build, BuildMode, BuildOptions};
use cbuild::util::process::SystemRunner;
use cbuild::util::Status;

pub fn execute(args: BuildArgs, global_opts: &GlobalOptions) -> Result<()> {
    let mode = match args.target {
        Some(target) => BuildMode::Target(target),
        None => BuildMode::All,
    };
    run(
        BuildOptions {
            toolchain: args.toolchain,
            configurations: args.configs,
            mode,
            dry_run: args.dry_run,
        },
        global_opts,
    )
}

pub fn execute_deps(args: BuildDepsArgs, global_opts: &GlobalOptions) -> Result<()> {
    run(
        BuildOptions {
            toolchain: args.toolchain,
            configurations: args.configs,
            mode: BuildMode::Dependencies(args.target),
            dry_run: args.dry_run,
        },
        global_opts,
    )
}

fn run(opts: BuildOptions, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ws = global_opts.load_workspace()?;

    let what = match &opts.mode {
        BuildMode::All => "all targets".to_string(),
        BuildMode::Target(name) => format!("target `{}`", name),
        BuildMode::Dependencies(name) => format!("dependencies of `{}`", name),
    };
    shell.status(Status::Building, &what);

    build(&ws, &opts, &SystemRunner)?;

    if opts.dry_run {
        shell.status(Status::Finished, format!("{} (dry run)", what));
    } else {
        shell.status(Status::Finished, what);
    }
    Ok(())
}
