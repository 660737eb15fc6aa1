//! Toolchain descriptors stored under `toolchains/<name>/toolchain.yml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::system::{Platform, Processor};
use crate::core::workspace::Workspace;
use crate::util::fs::write_string;
use crate::util::yaml::null_as_default;

/// Descriptor file name inside a toolchain directory.
pub const TOOLCHAIN_FILE: &str = "toolchain.yml";

/// Inputs for generating a CMake toolchain file on the current host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub c_compiler: String,
    pub cxx_compiler: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub linker: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub extra_cxx_flags: Vec<String>,
}

/// Per-host entry: either an existing toolchain file or generation inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CMakeToolchainOptions {
    /// Path relative to the toolchain directory.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmake_toolchain_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<GenerateOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Entries keyed by `host-<platform>-<processor>`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cmake_toolchain: BTreeMap<String, CMakeToolchainOptions>,
    pub target_arch: Processor,
    pub target_system: Platform,
}

impl Toolchain {
    /// A toolchain targeting `system`/`arch` with a single generated entry.
    pub fn generated(
        system: Platform,
        arch: Processor,
        host_key: impl Into<String>,
        generate: GenerateOptions,
    ) -> Self {
        let mut cmake_toolchain = BTreeMap::new();
        cmake_toolchain.insert(
            host_key.into(),
            CMakeToolchainOptions {
                cmake_toolchain_file: String::new(),
                generate: Some(generate),
            },
        );
        Toolchain {
            cmake_toolchain,
            target_arch: arch,
            target_system: system,
        }
    }

    /// Read a descriptor file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain file {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("failed to serialize toolchain")?;
        write_string(path, &yaml)
    }

    /// The entry for a given host key, if the descriptor has one.
    pub fn for_host(&self, host_key: &str) -> Option<&CMakeToolchainOptions> {
        self.cmake_toolchain.get(host_key)
    }
}

/// A named toolchain loaded from a workspace.
#[derive(Debug, Clone)]
pub struct LoadedToolchain {
    pub name: String,
    pub dir: PathBuf,
    pub toolchain: Toolchain,
}

impl LoadedToolchain {
    /// Load `toolchains/<name>/toolchain.yml`.
    pub fn load(ws: &Workspace, name: &str) -> Result<Self> {
        let dir = ws.toolchains_dir().join(name);
        let toolchain = Toolchain::from_path(&dir.join(TOOLCHAIN_FILE))
            .with_context(|| format!("failed to load toolchain `{}`", name))?;
        Ok(LoadedToolchain {
            name: name.to_string(),
            dir,
            toolchain,
        })
    }

    /// Whether `toolchains/<name>/toolchain.yml` exists.
    pub fn exists(ws: &Workspace, name: &str) -> bool {
        ws.toolchains_dir().join(name).join(TOOLCHAIN_FILE).is_file()
    }

    /// Where the generated toolchain file for this toolchain lives.
    pub fn generated_file(ws: &Workspace, name: &str) -> PathBuf {
        ws.buildspaces_dir().join(name).join("generated_toolchain.cmake")
    }

    /// Resolve the toolchain file CMake should use on `host_key`.
    ///
    /// Returns `None` when the descriptor has no entry for the host.
    pub fn toolchain_file(&self, ws: &Workspace, host_key: &str) -> Option<PathBuf> {
        let entry = self.toolchain.for_host(host_key)?;
        if entry.generate.is_some() {
            Some(Self::generated_file(ws, &self.name))
        } else {
            Some(self.dir.join(&entry.cmake_toolchain_file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"
target_arch: x64
target_system: linux
cmake_toolchain:
  host-linux-x64:
    generate:
      c_compiler: gcc-12
      cxx_compiler: g++-12
      extra_cxx_flags: ["-stdlib=libstdc++"]
  host-mac-arm64:
    cmake_toolchain_file: cross/linux.cmake
"#;

    fn setup(dir: &Path) -> Workspace {
        let ws = Workspace::empty(dir);
        let tc_dir = ws.toolchains_dir().join("cross");
        std::fs::create_dir_all(&tc_dir).unwrap();
        std::fs::write(tc_dir.join(TOOLCHAIN_FILE), DESCRIPTOR).unwrap();
        ws
    }

    #[test]
    fn test_parse_descriptor() {
        let tmp = TempDir::new().unwrap();
        let ws = setup(tmp.path());
        let loaded = LoadedToolchain::load(&ws, "cross").unwrap();

        assert_eq!(loaded.toolchain.target_arch, Processor::X64);
        assert_eq!(loaded.toolchain.target_system, Platform::Linux);

        let gen = loaded.toolchain.for_host("host-linux-x64").unwrap().generate.as_ref().unwrap();
        assert_eq!(gen.c_compiler, "gcc-12");
        assert_eq!(gen.extra_cxx_flags, vec!["-stdlib=libstdc++"]);
    }

    #[test]
    fn test_toolchain_file_resolution() {
        let tmp = TempDir::new().unwrap();
        let ws = setup(tmp.path());
        let loaded = LoadedToolchain::load(&ws, "cross").unwrap();

        assert_eq!(
            loaded.toolchain_file(&ws, "host-linux-x64").unwrap(),
            ws.root().join("buildspaces/cross/generated_toolchain.cmake")
        );
        assert_eq!(
            loaded.toolchain_file(&ws, "host-mac-arm64").unwrap(),
            ws.root().join("toolchains/cross/cross/linux.cmake")
        );
        assert!(loaded.toolchain_file(&ws, "host-windows-x64").is_none());
    }

    #[test]
    fn test_missing_toolchain() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        assert!(!LoadedToolchain::exists(&ws, "nope"));
        let err = LoadedToolchain::load(&ws, "nope").unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load toolchain `nope`"));
    }

    #[test]
    fn test_write_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("toolchains/system-gcc").join(TOOLCHAIN_FILE);
        let tc = Toolchain::generated(
            Platform::Linux,
            Processor::Arm64,
            "host-linux-arm64",
            GenerateOptions {
                c_compiler: "gcc".into(),
                cxx_compiler: "g++".into(),
                ..Default::default()
            },
        );

        tc.write(&path).unwrap();
        assert_eq!(Toolchain::from_path(&path).unwrap(), tc);
    }
}
