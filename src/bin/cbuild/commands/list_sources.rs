//! `cbuild list-sources` command

use anyhow::Result;

use crate::GlobalOptions;
use cbuild::ops::list_sources;

pub fn execute(global_opts: &GlobalOptions) -> Result<()> {
    let ws = global_opts.load_workspace()?;

    for entry in list_sources(&ws)? {
        println!("{}", entry);
    }
    Ok(())
}
