//! `cbuild init` command

use anyhow::{Context, Result};

use crate::cli::InitArgs;
use crate::GlobalOptions;
use cbuild::ops::{init_workspace, InitOptions};
use cbuild::util::Status;

pub fn execute(args: InitArgs, global_opts: &GlobalOptions) -> Result<()> {
    let path = match args.path.or_else(|| global_opts.workspace.clone()) {
        Some(path) => path,
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let ws = init_workspace(&path, InitOptions { reinit: args.reinit })?;

    global_opts.shell.status(
        Status::Created,
        format!("empty workspace in {}", ws.root().display()),
    );
    Ok(())
}
