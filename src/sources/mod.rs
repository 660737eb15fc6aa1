//! Source acquisition.
//!
//! Sources land in `sources/<name>`: git sources are cloned (or added as a
//! submodule), local sources are linked.

pub mod git;

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::source::{CodeSource, SourceError};
use crate::core::workspace::Workspace;
use crate::util::fs::{ensure_dir, symlink};

pub use git::{repository_name, Git2Client, GitClient};

/// How git sources are brought into the workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Use `git submodule add` instead of a plain clone.
    pub submodule: bool,
}

/// Fetch `source` into `sources/<name>`. An existing directory is left alone.
pub fn fetch_source(
    ws: &Workspace,
    name: &str,
    source: &CodeSource,
    git: &dyn GitClient,
    opts: FetchOptions,
) -> Result<()> {
    source
        .validate()
        .with_context(|| format!("invalid source `{}`", name))?;

    let dest = ws.source_dir(name);
    if dest.exists() {
        tracing::info!("source `{}` already present at {}", name, dest.display());
        return Ok(());
    }
    ensure_dir(&ws.sources_dir())?;

    match source {
        CodeSource::Git(repo) => {
            if opts.submodule {
                let rel = Path::new("sources").join(name);
                git.submodule_add(ws.root(), &repo.repository, &rel)?;
            } else {
                git.clone_repo(&repo.repository, &dest)?;
            }

            if let Some(rev) = repo.revision.as_deref().filter(|r| !r.is_empty()) {
                git.checkout(&dest, rev)?;
            }
        }
        CodeSource::Local(path) => {
            let target = if path.is_absolute() {
                path.clone()
            } else {
                ws.root().join(path)
            };
            if !target.is_dir() {
                return Err(SourceError::LocalMissing { path: target }.into());
            }

            tracing::info!("Linking {} -> {}", dest.display(), target.display());
            symlink(&target, &dest)
                .with_context(|| format!("failed to link {}", dest.display()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGitClient;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_git_with_revision() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        let git = FakeGitClient::new();

        let source = CodeSource::git("https://example.com/fmt.git", Some("10.2.1".into()));
        fetch_source(&ws, "fmt", &source, &git, FetchOptions::default()).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                format!("clone https://example.com/fmt.git {}", ws.source_dir("fmt").display()),
                format!("checkout {} 10.2.1", ws.source_dir("fmt").display()),
            ]
        );
        assert!(ws.source_dir("fmt").is_dir());
    }

    #[test]
    fn test_fetch_submodule() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        let git = FakeGitClient::new();

        let source = CodeSource::git("https://example.com/zlib.git", None);
        fetch_source(&ws, "zlib", &source, &git, FetchOptions { submodule: true }).unwrap();

        assert_eq!(
            git.calls(),
            vec![format!(
                "submodule-add {} https://example.com/zlib.git {}",
                ws.root().display(),
                Path::new("sources").join("zlib").display()
            )]
        );
    }

    #[test]
    fn test_existing_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        std::fs::create_dir_all(ws.source_dir("fmt")).unwrap();
        let git = FakeGitClient::new();

        let source = CodeSource::git("https://example.com/fmt.git", None);
        fetch_source(&ws, "fmt", &source, &git, FetchOptions::default()).unwrap();
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_local_source_missing() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        let git = FakeGitClient::new();

        let source = CodeSource::Local("../nowhere".into());
        let err = fetch_source(&ws, "app", &source, &git, FetchOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::LocalMissing { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_local_source_is_linked() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path().join("ws"));
        let app = tmp.path().join("app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("CMakeLists.txt"), "").unwrap();

        let source = CodeSource::Local(app);
        fetch_source(&ws, "app", &source, &FakeGitClient::new(), FetchOptions::default()).unwrap();
        assert!(ws.source_dir("app").join("CMakeLists.txt").is_file());
    }
}
