//! Implementation of `cbuild list-sources`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::workspace::Workspace;
use crate::util::fs::list_dirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Ok,
    OkExternal,
    Missing,
    /// A directory under `sources/` nothing in the workspace refers to.
    Untracked,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceState::Ok => "[OK]",
            SourceState::OkExternal => "[OK EXTERNAL]",
            SourceState::Missing => "[MISSING]",
            SourceState::Untracked => "[UNTRACKED]",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
    pub state: SourceState,
}

impl fmt::Display for SourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.state, self.name, self.path.display())
    }
}

/// One entry per target, then one per untracked directory under `sources/`.
pub fn list_sources(ws: &Workspace) -> Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    let mut known: BTreeSet<String> = ws.config.sources.keys().cloned().collect();

    for name in ws.config.targets.keys() {
        let target = ws.target(name)?;
        known.insert(target.source_name().to_string());

        let external = target.config.external_source_override.is_some();
        let state = match (target.source_exists(ws), external) {
            (true, true) => SourceState::OkExternal,
            (true, false) => SourceState::Ok,
            (false, _) => SourceState::Missing,
        };
        entries.push(SourceEntry {
            name: name.clone(),
            path: target.source_path(ws),
            state,
        });
    }

    for dir in list_dirs(&ws.sources_dir())? {
        if !known.contains(&dir) {
            entries.push(SourceEntry {
                path: ws.source_dir(&dir),
                name: dir,
                state: SourceState::Untracked,
            });
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::TargetConfiguration;
    use crate::test_support::sample_workspace;
    use tempfile::TempDir;

    #[test]
    fn test_states() {
        let tmp = TempDir::new().unwrap();
        let mut ws = sample_workspace(tmp.path());
        std::fs::create_dir_all(ws.source_dir("fmt")).unwrap();
        std::fs::create_dir_all(ws.source_dir("leftover")).unwrap();

        let external = tmp.path().join("external/zlib");
        std::fs::create_dir_all(&external).unwrap();
        let mut zlib = TargetConfiguration::cmake("");
        zlib.external_source_override = Some(external);
        ws.config.targets.insert("zlib".into(), zlib);

        let states: Vec<(String, SourceState)> = list_sources(&ws)
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.state))
            .collect();

        assert_eq!(
            states,
            vec![
                ("app".to_string(), SourceState::Missing),
                ("fmt".to_string(), SourceState::Ok),
                ("zlib".to_string(), SourceState::OkExternal),
                ("leftover".to_string(), SourceState::Untracked),
            ]
        );
    }

    #[test]
    fn test_entry_display() {
        let entry = SourceEntry {
            name: "fmt".into(),
            path: PathBuf::from("/ws/sources/fmt"),
            state: SourceState::OkExternal,
        };
        assert_eq!(entry.to_string(), "[OK EXTERNAL] fmt (/ws/sources/fmt)");
    }
}
