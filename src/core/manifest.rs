//! Per-source manifests: a source's default target configuration and the
//! dependencies it suggests fetching.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::source::CodeSource;
use crate::core::target::TargetConfiguration;
use crate::util::fs::read_to_string;
use crate::util::yaml::null_as_default;

/// Recognized manifest file names, in lookup order.
pub const MANIFEST_NAMES: [&str; 4] = ["csetup.yml", "csetuplists.yml", "CSetup.yml", "CSetupLists.yml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceManifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_configuration: TargetConfiguration,

    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_dep_sources: BTreeMap<String, CodeSource>,
}

impl SourceManifest {
    /// Find the first recognized manifest file in `dir`.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        MANIFEST_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(SourceManifest::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }

    /// Load the manifest in `dir`, if there is one.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        Self::find(dir).map(|path| Self::load(&path)).transpose()
    }
}
