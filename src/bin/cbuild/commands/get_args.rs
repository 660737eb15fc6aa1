//! `cbuild get-args` command

use anyhow::Result;

use crate::cli::GetArgsArgs;
use crate::GlobalOptions;
use cbuild::ops::get_build_args;

pub fn execute(args: GetArgsArgs, global_opts: &GlobalOptions) -> Result<()> {
    let ws = global_opts.load_workspace()?;
    let build_args = get_build_args(&ws, &args.target, &args.toolchain, &args.config)?;

    println!("{}", build_args.join(" "));
    Ok(())
}
