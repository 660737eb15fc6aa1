//! Workspace edits: dependencies, sources, targets, and global settings.
//!
//! Each operation mutates the loaded workspace and saves it.

use anyhow::Result;

use crate::core::workspace::{Workspace, WorkspaceError};
use crate::util::fs::remove_dir_all_if_exists;

/// Add `dep` to `target`'s dependencies. Returns false if it was already there.
pub fn add_dependency(ws: &mut Workspace, target: &str, dep: &str) -> Result<bool> {
    let added = ws.add_dependency(target, dep)?;
    if added {
        ws.save()?;
    }
    Ok(added)
}

/// Remove `dep` from `target`'s dependencies. Returns false if it wasn't there.
pub fn remove_dependency(ws: &mut Workspace, target: &str, dep: &str) -> Result<bool> {
    let removed = ws.remove_dependency(target, dep)?;
    if removed {
        ws.save()?;
    }
    Ok(removed)
}

/// Forget a source, optionally deleting `sources/<name>`.
pub fn remove_source(ws: &mut Workspace, name: &str, delete_files: bool) -> Result<()> {
    if ws.config.sources.remove(name).is_none() {
        return Err(WorkspaceError::UnknownSource {
            name: name.to_string(),
        }
        .into());
    }

    if delete_files {
        remove_dir_all_if_exists(&ws.source_dir(name))?;
    }
    ws.save()
}

pub fn remove_target(ws: &mut Workspace, name: &str) -> Result<()> {
    if ws.config.targets.remove(name).is_none() {
        return Err(WorkspaceError::UnknownTarget {
            name: name.to_string(),
        }
        .into());
    }
    ws.save()
}

/// What `remove_project` removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedProject {
    pub source: bool,
    pub targets: Vec<String>,
}

/// Remove a source together with every target built from it.
pub fn remove_project(ws: &mut Workspace, name: &str, delete_files: bool) -> Result<RemovedProject> {
    let targets = ws.targets_using_source(name);
    let source = ws.config.sources.remove(name).is_some();

    if !source && targets.is_empty() {
        return Err(WorkspaceError::UnknownProject {
            name: name.to_string(),
        }
        .into());
    }

    for target in &targets {
        ws.config.targets.remove(target);
    }
    if delete_files {
        remove_dir_all_if_exists(&ws.source_dir(name))?;
    }

    ws.save()?;
    Ok(RemovedProject { source, targets })
}

/// Delete `sources/<name>` but keep the source registered.
pub fn drop_source_files(ws: &Workspace, name: &str) -> Result<()> {
    ws.source(name)?;
    remove_dir_all_if_exists(&ws.source_dir(name))
}

/// Set the C++ standard of one target, or the workspace default.
pub fn set_cxx_version(ws: &mut Workspace, version: &str, target: Option<&str>) -> Result<()> {
    match target {
        Some(target) => ws.target_mut(target)?.cxx_standard = Some(version.to_string()),
        None => ws.config.cxx_version = version.to_string(),
    }
    ws.save()
}

pub fn set_staging(ws: &mut Workspace, target: &str, staged: bool) -> Result<()> {
    ws.target_mut(target)?.staged = Some(staged);
    ws.save()
}

/// Add a build configuration. Returns false if it already existed.
pub fn add_configuration(ws: &mut Workspace, name: &str) -> Result<bool> {
    let added = ws.add_configuration(name);
    if added {
        ws.save()?;
    }
    Ok(added)
}

pub fn remove_configuration(ws: &mut Workspace, name: &str) -> Result<()> {
    ws.remove_configuration(name)?;
    ws.save()
}
