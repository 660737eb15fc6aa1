//! `cbuild git-clone`, `cbuild download`, and `cbuild load-defaults`

use anyhow::Result;

use crate::cli::{DownloadArgs, FetchFlags, GitCloneArgs, LoadDefaultsArgs};
use crate::GlobalOptions;
use cbuild::ops::{self, AutoConfirm, Confirm, DownloadOptions, PromptConfirm};
use cbuild::sources::{FetchOptions, Git2Client};
use cbuild::util::Status;

fn confirmer(flags: &FetchFlags) -> Box<dyn Confirm> {
    if flags.download_deps {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    }
}

fn fetch_options(flags: &FetchFlags) -> FetchOptions {
    FetchOptions {
        submodule: flags.submodule,
    }
}

pub fn git_clone(args: GitCloneArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;
    let git = Git2Client::new(shell.clone());
    let confirm = confirmer(&args.fetch);

    shell.status(Status::Fetching, &args.url);
    let name = ops::git_clone(
        &mut ws,
        &args.url,
        args.name.as_deref(),
        args.revision,
        &git,
        confirm.as_ref(),
        DownloadOptions {
            fetch: fetch_options(&args.fetch),
            no_setup: args.no_setup,
        },
    )?;

    shell.status(Status::Added, format!("source and target `{}`", name));
    Ok(())
}

pub fn download(args: DownloadArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;
    let git = Git2Client::new(shell.clone());
    let confirm = confirmer(&args.fetch);

    let fetched = ops::download(
        &mut ws,
        args.source.as_deref(),
        &git,
        confirm.as_ref(),
        DownloadOptions {
            fetch: fetch_options(&args.fetch),
            no_setup: args.no_setup,
        },
    )?;

    if fetched.is_empty() {
        shell.note("every source is already present");
    }
    for name in fetched {
        shell.status(Status::Fetching, format!("{} done", name));
    }
    Ok(())
}

pub fn load_defaults(args: LoadDefaultsArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;
    let git = Git2Client::new(shell.clone());
    let confirm = confirmer(&args.fetch);

    shell.status(Status::Resolving, format!("defaults for `{}`", args.source));
    ops::load_defaults(
        &mut ws,
        &args.source,
        &git,
        confirm.as_ref(),
        fetch_options(&args.fetch),
    )?;

    shell.status(Status::Updated, format!("targets of `{}`", args.source));
    Ok(())
}
