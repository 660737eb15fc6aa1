//! Implementation of `cbuild clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::context::BuildParameters;
use crate::core::workspace::Workspace;
use crate::util::fs::remove_dir_all_if_exists;

/// Build trees `clean` would remove for one toolchain.
///
/// With a configuration, that is `buildspaces/<tc>/<target>/<cfg>` for every
/// target; without one, the whole `buildspaces/<tc>`.
pub fn clean_paths(ws: &Workspace, toolchain: &str, configuration: Option<&str>) -> Vec<PathBuf> {
    match configuration.filter(|c| !c.is_empty()) {
        Some(cfg) => {
            let bp = BuildParameters::new(toolchain, cfg);
            ws.config
                .targets
                .keys()
                .filter_map(|name| ws.target(name).ok())
                .map(|target| target.build_path(ws, &bp))
                .collect()
        }
        None => vec![ws.buildspaces_dir().join(toolchain)],
    }
}

/// Remove build trees. Returns the paths that were (or would be) removed.
pub fn clean(
    ws: &Workspace,
    toolchains: &[String],
    configurations: &[String],
    dry_run: bool,
) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for toolchain in toolchains {
        let paths = if configurations.is_empty() {
            clean_paths(ws, toolchain, None)
        } else {
            configurations
                .iter()
                .flat_map(|cfg| clean_paths(ws, toolchain, Some(cfg)))
                .collect()
        };

        for path in paths {
            if !path.exists() {
                continue;
            }
            if dry_run {
                tracing::info!("dry-run: remove {}", path.display());
            } else {
                tracing::info!("Removing {}", path.display());
                remove_dir_all_if_exists(&path)?;
            }
            removed.push(path);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_workspace;
    use tempfile::TempDir;

    #[test]
    fn test_clean_one_configuration() {
        let tmp = TempDir::new().unwrap();
        let ws = sample_workspace(tmp.path());
        let bs = ws.buildspaces_dir();
        for dir in ["gcc/app/Debug", "gcc/app/Release", "gcc/fmt/Debug"] {
            std::fs::create_dir_all(bs.join(dir)).unwrap();
        }

        let removed = clean(&ws, &["gcc".into()], &["Debug".into()], false).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!bs.join("gcc/app/Debug").exists());
        assert!(bs.join("gcc/app/Release").exists());
    }

    #[test]
    fn test_clean_whole_toolchain() {
        let tmp = TempDir::new().unwrap();
        let ws = sample_workspace(tmp.path());
        std::fs::create_dir_all(ws.buildspaces_dir().join("gcc/app/Debug")).unwrap();
        std::fs::create_dir_all(ws.buildspaces_dir().join("clang/app/Debug")).unwrap();

        clean(&ws, &["gcc".into()], &[], false).unwrap();
        assert!(!ws.buildspaces_dir().join("gcc").exists());
        assert!(ws.buildspaces_dir().join("clang").exists());
    }

    #[test]
    fn test_clean_dry_run_keeps_files() {
        let tmp = TempDir::new().unwrap();
        let ws = sample_workspace(tmp.path());
        std::fs::create_dir_all(ws.buildspaces_dir().join("gcc/fmt/Debug")).unwrap();

        let removed = clean(&ws, &["gcc".into()], &[], true).unwrap();
        assert_eq!(removed, vec![ws.buildspaces_dir().join("gcc")]);
        assert!(ws.buildspaces_dir().join("gcc/fmt/Debug").exists());
    }
}
