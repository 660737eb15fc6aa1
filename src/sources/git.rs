//! Git plumbing for fetching sources.

use std::path::Path;

use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks, Repository, ResetType, SubmoduleUpdateOptions};
use url::Url;

use crate::util::fs::relative_path;
use crate::util::shell::{Progress, Shell};

/// The git operations source acquisition needs.
pub trait GitClient {
    /// Clone `repository` into `dest`.
    fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()>;

    /// Add `repository` as a submodule of the repository containing
    /// `workspace_root`, checked out at `workspace_root/<path>`.
    fn submodule_add(&self, workspace_root: &Path, repository: &str, path: &Path) -> Result<()>;

    /// Check out `revision` (commit, tag, or branch) in `repo_dir`.
    fn checkout(&self, repo_dir: &Path, revision: &str) -> Result<()>;
}

/// `GitClient` backed by libgit2.
#[derive(Debug, Clone, Default)]
pub struct Git2Client {
    shell: Shell,
}

impl Git2Client {
    pub fn new(shell: Shell) -> Self {
        Git2Client { shell }
    }
}

fn fetch_options(progress: &Progress) -> FetchOptions<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |stats| {
        progress.set_length(stats.total_objects() as u64);
        progress.set_position(stats.received_objects() as u64);
        true
    });

    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);
    fetch
}

impl GitClient for Git2Client {
    fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()> {
        tracing::info!("Cloning {} into {}", repository, dest.display());

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let progress = self.shell.progress(0, format!("cloning {}", repository));
        let result = RepoBuilder::new()
            .fetch_options(fetch_options(&progress))
            .clone(repository, dest);
        progress.finish();

        result.with_context(|| format!("failed to clone {}", repository))?;
        Ok(())
    }

    fn submodule_add(&self, workspace_root: &Path, repository: &str, path: &Path) -> Result<()> {
        tracing::info!("Adding submodule {} at {}", repository, path.display());

        let repo = Repository::discover(workspace_root).with_context(|| {
            format!(
                "{} is not inside a git repository; cannot add a submodule",
                workspace_root.display()
            )
        })?;
        let workdir = repo
            .workdir()
            .context("cannot add a submodule to a bare repository")?;
        let sub_path = relative_path(workdir, &workspace_root.join(path));

        let progress = self.shell.progress(0, format!("cloning {}", repository));
        let mut update = SubmoduleUpdateOptions::new();
        update.fetch(fetch_options(&progress));

        let result = (|| -> Result<(), git2::Error> {
            let mut submodule = repo.submodule(repository, &sub_path, true)?;
            submodule.clone(Some(&mut update))?;
            submodule.add_finalize()
        })();
        progress.finish();

        result.with_context(|| format!("failed to add submodule {}", repository))?;
        Ok(())
    }

    fn checkout(&self, repo_dir: &Path, revision: &str) -> Result<()> {
        tracing::info!("Checking out {} in {}", revision, repo_dir.display());

        let repo = Repository::open(repo_dir)
            .with_context(|| format!("failed to open git repository {}", repo_dir.display()))?;

        let object = repo
            .revparse_single(revision)
            .or_else(|_| repo.revparse_single(&format!("origin/{}", revision)))
            .with_context(|| format!("revision `{}` not found", revision))?;
        let commit = object.peel_to_commit()?;

        repo.set_head_detached(commit.id())?;
        repo.reset(commit.as_object(), ResetType::Hard, None)
            .with_context(|| format!("failed to check out {}", revision))?;

        Ok(())
    }
}

/// Derive a source name from a repository URL: its last path segment
/// without a `.git` suffix.
pub fn repository_name(repository: &str) -> Option<String> {
    let path = match Url::parse(repository) {
        Ok(url) => url.path().to_string(),
        // scp-like `git@host:org/repo.git`, or a plain path
        Err(_) => repository
            .rsplit_once(':')
            .map(|(_, p)| p.to_string())
            .unwrap_or_else(|| repository.to_string()),
    };

    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_name() {
        assert_eq!(
            repository_name("https://github.com/fmtlib/fmt.git").as_deref(),
            Some("fmt")
        );
        assert_eq!(
            repository_name("https://gitlab.com/org/project/").as_deref(),
            Some("project")
        );
        assert_eq!(
            repository_name("git@github.com:madler/zlib.git").as_deref(),
            Some("zlib")
        );
        assert_eq!(repository_name("https://example.com/"), None);
    }

    #[test]
    fn test_checkout_unknown_repo_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = Git2Client::default()
            .checkout(tmp.path(), "v1.0")
            .unwrap_err();
        assert!(err.to_string().contains("failed to open git repository"));
    }
}
