//! Workspace - the persisted root document and its location on disk.
//!
//! A workspace is loaded once per command, mutated in memory, and written
//! back in full by `save`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::source::CodeSource;
use crate::core::target::{TargetConfiguration, TargetContext};
use crate::util::fs::{ensure_dir, list_dirs};
use crate::util::yaml::{flow_style_sequences, null_as_default};

/// Workspace file name, at the workspace root.
pub const WORKSPACE_FILE: &str = "cbuild_workspace.yml";

/// Build configurations used when the workspace lists none.
pub const DEFAULT_CONFIGURATIONS: [&str; 2] = ["Debug", "Release"];

/// Errors raised by lookups and edits on the workspace model.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no {} found in `{}`", WORKSPACE_FILE, path.display())]
    NotFound { path: PathBuf },

    #[error("{} already exists; use --reinit to overwrite", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("target `{name}` not found in workspace")]
    UnknownTarget { name: String },

    #[error("source `{name}` not found in workspace")]
    UnknownSource { name: String },

    #[error("unsupported project type: {project_type}")]
    UnsupportedProjectType { project_type: String },

    #[error("dependency cycle detected: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("configuration `{name}` not found")]
    UnknownConfiguration { name: String },

    #[error("no sources or targets for `{name}` found in workspace")]
    UnknownProject { name: String },
}

/// The persisted workspace document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: BTreeMap<String, CodeSource>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: BTreeMap<String, TargetConfiguration>,

    /// CMake executable to run instead of `cmake` from `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_binary: Option<String>,

    /// Default C++ standard for targets that don't set their own.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cxx_version: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub configurations: Vec<String>,
}

/// A loaded workspace: its absolute root plus the parsed document.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    pub config: WorkspaceConfig,
}

impl Workspace {
    /// A workspace at `root` with an empty document. Nothing is read or written.
    pub fn empty(root: impl AsRef<Path>) -> Self {
        Workspace {
            root: absolute(root.as_ref()),
            config: WorkspaceConfig::default(),
        }
    }

    /// Load the workspace file under `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = absolute(root.as_ref());
        let path = root.join(WORKSPACE_FILE);
        if !path.is_file() {
            return Err(WorkspaceError::NotFound { path: root }.into());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let mut config: WorkspaceConfig = if contents.trim().is_empty() {
            WorkspaceConfig::default()
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        };

        if config.configurations.is_empty() {
            config.configurations = DEFAULT_CONFIGURATIONS.iter().map(|s| s.to_string()).collect();
        }

        tracing::debug!("loaded workspace from {}", path.display());
        Ok(Workspace { root, config })
    }

    /// Write the document back to the workspace file.
    ///
    /// The new contents go to a temporary file beside the target, which is
    /// then renamed over it.
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.config).context("failed to serialize workspace")?;
        let yaml = flow_style_sequences(&yaml, "targets", "extra_cmake_configure_args")?;

        ensure_dir(&self.root)?;
        let path = self.workspace_file();
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .with_context(|| format!("failed to create temporary file in {}", self.root.display()))?;
        tmp.write_all(yaml.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::debug!("saved workspace to {}", path.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace_file(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILE)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join("sources")
    }

    pub fn buildspaces_dir(&self) -> PathBuf {
        self.root.join("buildspaces")
    }

    pub fn toolchains_dir(&self) -> PathBuf {
        self.root.join("toolchains")
    }

    /// `sources/<name>`
    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.sources_dir().join(name)
    }

    /// The CMake executable to invoke.
    pub fn cmake_binary(&self) -> &str {
        self.config
            .cmake_binary
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or("cmake")
    }

    /// Configurations to build, falling back to the defaults.
    pub fn configurations(&self) -> Vec<String> {
        if self.config.configurations.is_empty() {
            DEFAULT_CONFIGURATIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.config.configurations.clone()
        }
    }

    /// Snapshot a target by name.
    pub fn target(&self, name: &str) -> Result<TargetContext, WorkspaceError> {
        self.config
            .targets
            .get(name)
            .map(|config| TargetContext::new(name, config.clone()))
            .ok_or_else(|| WorkspaceError::UnknownTarget {
                name: name.to_string(),
            })
    }

    pub fn target_mut(&mut self, name: &str) -> Result<&mut TargetConfiguration, WorkspaceError> {
        self.config
            .targets
            .get_mut(name)
            .ok_or_else(|| WorkspaceError::UnknownTarget {
                name: name.to_string(),
            })
    }

    pub fn source(&self, name: &str) -> Result<&CodeSource, WorkspaceError> {
        self.config
            .sources
            .get(name)
            .ok_or_else(|| WorkspaceError::UnknownSource {
                name: name.to_string(),
            })
    }

    /// Names of every target whose effective source is `source`.
    pub fn targets_using_source(&self, source: &str) -> Vec<String> {
        self.config
            .targets
            .iter()
            .filter(|(name, config)| config.source_name(name) == source)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Toolchain directory names under `toolchains/`, sorted.
    pub fn toolchain_names(&self) -> Result<Vec<String>> {
        list_dirs(&self.toolchains_dir())
    }

    /// Append `dep` to a target's dependencies. Returns false if already present.
    pub fn add_dependency(&mut self, target: &str, dep: &str) -> Result<bool, WorkspaceError> {
        let config = self.target_mut(target)?;
        if config.depends.iter().any(|d| d == dep) {
            return Ok(false);
        }
        config.depends.push(dep.to_string());
        Ok(true)
    }

    /// Drop `dep` from a target's dependencies. Returns false if it wasn't there.
    pub fn remove_dependency(&mut self, target: &str, dep: &str) -> Result<bool, WorkspaceError> {
        let config = self.target_mut(target)?;
        let before = config.depends.len();
        config.depends.retain(|d| d != dep);
        Ok(config.depends.len() != before)
    }

    /// Add a build configuration. Returns false if already present.
    pub fn add_configuration(&mut self, name: &str) -> bool {
        if self.config.configurations.iter().any(|c| c == name) {
            return false;
        }
        self.config.configurations.push(name.to_string());
        true
    }

    pub fn remove_configuration(&mut self, name: &str) -> Result<(), WorkspaceError> {
        let before = self.config.configurations.len();
        self.config.configurations.retain(|c| c != name);
        if self.config.configurations.len() == before {
            return Err(WorkspaceError::UnknownConfiguration {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Search upward from `start` for a directory holding the workspace file.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let start = absolute(start);
    start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_FILE).is_file())
        .map(Path::to_path_buf)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
