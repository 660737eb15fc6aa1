//! Implementation of `cbuild init`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::workspace::{Workspace, WorkspaceError};
use crate::util::fs::remove_dir_all_if_exists;

/// Global C++ standard written into a fresh workspace.
pub const DEFAULT_CXX_VERSION: &str = "20";

/// Options for `cbuild init`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Overwrite an existing workspace, deleting its toolchains, sources,
    /// and build trees.
    pub reinit: bool,
}

/// Create an empty workspace at `path`.
pub fn init_workspace(path: &Path, opts: InitOptions) -> Result<Workspace> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))?;

    let mut ws = Workspace::empty(path);
    let file = ws.workspace_file();
    if file.exists() {
        if !opts.reinit {
            return Err(WorkspaceError::AlreadyInitialized { path: file }.into());
        }

        for dir in [ws.toolchains_dir(), ws.sources_dir(), ws.buildspaces_dir()] {
            tracing::debug!("removing {}", dir.display());
            remove_dir_all_if_exists(&dir)?;
        }
    }

    ws.config.cxx_version = DEFAULT_CXX_VERSION.to_string();
    ws.save()?;
    Ok(ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_workspace() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ws");

        init_workspace(&path, InitOptions::default()).unwrap();

        let ws = Workspace::load(&path).unwrap();
        assert_eq!(ws.config.cxx_version, "20");
        assert!(ws.config.targets.is_empty());
        assert_eq!(ws.configurations(), vec!["Debug", "Release"]);
    }

    #[test]
    fn test_init_refuses_existing() {
        let tmp = TempDir::new().unwrap();
        init_workspace(tmp.path(), InitOptions::default()).unwrap();

        let err = init_workspace(tmp.path(), InitOptions::default()).unwrap_err();
        assert!(err.to_string().contains("use --reinit to overwrite"));
    }

    #[test]
    fn test_reinit_clears_trees() {
        let tmp = TempDir::new().unwrap();
        let ws = init_workspace(tmp.path(), InitOptions::default()).unwrap();
        fs::create_dir_all(ws.source_dir("fmt")).unwrap();
        fs::create_dir_all(ws.toolchains_dir().join("gcc")).unwrap();
        fs::create_dir_all(ws.root().join("staging")).unwrap();

        init_workspace(tmp.path(), InitOptions { reinit: true }).unwrap();

        assert!(!ws.sources_dir().exists());
        assert!(!ws.toolchains_dir().exists());
        assert!(ws.root().join("staging").exists());
    }
}
