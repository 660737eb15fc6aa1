//! `cbuild clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::GlobalOptions;
use cbuild::ops::cbuild_build::resolve_toolchains;
use cbuild::ops::clean;
use cbuild::util::Status;

pub fn execute(args: CleanArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ws = global_opts.load_workspace()?;

    let toolchains = resolve_toolchains(&ws, &args.toolchain)?;
    let removed = clean(&ws, &toolchains, &args.configs, args.dry_run)?;

    if removed.is_empty() {
        shell.note("nothing to clean");
    }
    for path in removed {
        if args.dry_run {
            shell.status(Status::Info, format!("would remove {}", path.display()));
        } else {
            shell.status(Status::Removed, path.display());
        }
    }
    Ok(())
}
