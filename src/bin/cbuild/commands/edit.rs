//! Commands that edit the workspace file

use anyhow::Result;

use crate::cli::{DependencyArgs, NameArgs, RemoveSourceArgs, SetCxxVersionArgs};
use crate::GlobalOptions;
use cbuild::ops::cbuild_edit;
use cbuild::util::Status;

pub fn add_dependency(args: DependencyArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;

    if cbuild_edit::add_dependency(&mut ws, &args.target, &args.dependency)? {
        shell.status(
            Status::Added,
            format!("{} as a dependency of {}", args.dependency, args.target),
        );
    } else {
        shell.note(format!(
            "{} already depends on {}",
            args.target, args.dependency
        ));
    }
    Ok(())
}

pub fn remove_dependency(args: DependencyArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;

    if cbuild_edit::remove_dependency(&mut ws, &args.target, &args.dependency)? {
        shell.status(
            Status::Removed,
            format!("{} from the dependencies of {}", args.dependency, args.target),
        );
    } else {
        shell.warn(format!(
            "dependency {} not found in {}",
            args.dependency, args.target
        ));
    }
    Ok(())
}

pub fn remove_source(args: RemoveSourceArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;

    cbuild_edit::remove_source(&mut ws, &args.source, args.delete)?;

    shell.status(Status::Removed, format!("source {}", args.source));
    if !args.delete {
        shell.note(format!(
            "files in {} were not deleted (use -D to delete them)",
            ws.source_dir(&args.source).display()
        ));
    }
    Ok(())
}

pub fn remove_target(args: NameArgs, global_opts: &GlobalOptions) -> Result<()> {
    let mut ws = global_opts.load_workspace()?;
    cbuild_edit::remove_target(&mut ws, &args.name)?;

    global_opts
        .shell
        .status(Status::Removed, format!("target {}", args.name));
    Ok(())
}

pub fn remove_project(args: RemoveSourceArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;

    let removed = cbuild_edit::remove_project(&mut ws, &args.source, args.delete)?;

    if removed.source {
        shell.status(Status::Removed, format!("source {}", args.source));
    }
    for target in &removed.targets {
        shell.status(Status::Removed, format!("target {}", target));
    }
    Ok(())
}

pub fn drop_files(args: NameArgs, global_opts: &GlobalOptions) -> Result<()> {
    let ws = global_opts.load_workspace()?;
    cbuild_edit::drop_source_files(&ws, &args.name)?;

    global_opts.shell.status(
        Status::Removed,
        ws.source_dir(&args.name).display(),
    );
    Ok(())
}

pub fn set_cxx_version(args: SetCxxVersionArgs, global_opts: &GlobalOptions) -> Result<()> {
    let mut ws = global_opts.load_workspace()?;
    cbuild_edit::set_cxx_version(&mut ws, &args.version, args.target.as_deref())?;

    let scope = match &args.target {
        Some(target) => format!("target {}", target),
        None => "workspace".to_string(),
    };
    global_opts.shell.status(
        Status::Updated,
        format!("C++ standard of {} to {}", scope, args.version),
    );
    Ok(())
}

pub fn set_staging(args: NameArgs, staged: bool, global_opts: &GlobalOptions) -> Result<()> {
    let mut ws = global_opts.load_workspace()?;
    cbuild_edit::set_staging(&mut ws, &args.name, staged)?;

    let state = if staged { "enabled" } else { "disabled" };
    global_opts
        .shell
        .status(Status::Updated, format!("staging {} for {}", state, args.name));
    Ok(())
}

pub fn add_config(args: NameArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let mut ws = global_opts.load_workspace()?;

    if cbuild_edit::add_configuration(&mut ws, &args.name)? {
        shell.status(Status::Added, format!("configuration {}", args.name));
    } else {
        shell.note(format!("configuration {} already exists", args.name));
    }
    Ok(())
}

pub fn remove_config(args: NameArgs, global_opts: &GlobalOptions) -> Result<()> {
    let mut ws = global_opts.load_workspace()?;
    cbuild_edit::remove_configuration(&mut ws, &args.name)?;

    global_opts
        .shell
        .status(Status::Removed, format!("configuration {}", args.name));
    Ok(())
}
