//! `cbuild detect-toolchains` command

use anyhow::Result;

use crate::GlobalOptions;
use cbuild::ops::detect_toolchains;
use cbuild::util::process::SystemRunner;
use cbuild::util::Status;

pub fn execute(global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ws = global_opts.load_workspace()?;

    let found = detect_toolchains(&ws, &SystemRunner)?;
    if found.is_empty() {
        shell.warn("no working toolchains found");
    }
    for name in found {
        shell.status(Status::Detected, name);
    }
    Ok(())
}
