//! Implementation of `cbuild git-clone`, `cbuild download`, and
//! `cbuild load-defaults`.

use anyhow::{bail, Context, Result};

use crate::core::source::CodeSource;
use crate::core::target::TargetConfiguration;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::ops::resolve::{process_source_manifest, Confirm, SuggestionResolver};
use crate::sources::{fetch_source, repository_name, FetchOptions, GitClient};

/// Options shared by the fetching commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    pub fetch: FetchOptions,

    /// Skip applying the fetched source's manifest.
    pub no_setup: bool,
}

/// Register a git source, fetch it, and give it a target.
///
/// Returns the source name.
pub fn git_clone(
    ws: &mut Workspace,
    repository: &str,
    name: Option<&str>,
    revision: Option<String>,
    git: &dyn GitClient,
    confirm: &dyn Confirm,
    opts: DownloadOptions,
) -> Result<String> {
    let name = match name {
        Some(name) => name.to_string(),
        None => repository_name(repository)
            .with_context(|| format!("cannot derive a source name from `{}`", repository))?,
    };

    if ws.config.sources.contains_key(&name) {
        bail!("source `{}` already exists in workspace", name);
    }

    let source = CodeSource::git(repository, revision);
    source.validate()?;

    fetch_source(ws, &name, &source, git, opts.fetch)
        .with_context(|| format!("failed to fetch {}", name))?;
    ws.config.sources.insert(name.clone(), source);

    if !ws.config.targets.contains_key(&name) {
        ws.config
            .targets
            .insert(name.clone(), TargetConfiguration::cmake(""));
        tracing::info!("Added target {}", name);
    }

    if !opts.no_setup {
        SuggestionResolver::new(git, confirm, opts.fetch).process(ws, &name)?;
    }

    ws.save()?;
    Ok(name)
}

/// Fetch `source`, or every registered source whose directory is missing.
///
/// Returns the names that were fetched.
pub fn download(
    ws: &mut Workspace,
    source: Option<&str>,
    git: &dyn GitClient,
    confirm: &dyn Confirm,
    opts: DownloadOptions,
) -> Result<Vec<String>> {
    let names: Vec<String> = match source {
        Some(name) => {
            ws.source(name)?;
            vec![name.to_string()]
        }
        None => ws
            .config
            .sources
            .keys()
            .filter(|name| !ws.source_dir(name).exists())
            .cloned()
            .collect(),
    };

    for name in &names {
        let source = ws.source(name)?.clone();
        fetch_source(ws, name, &source, git, opts.fetch)
            .with_context(|| format!("failed to fetch {}", name))?;

        if !opts.no_setup {
            SuggestionResolver::new(git, confirm, opts.fetch).process(ws, name)?;
        }
    }

    ws.save()?;
    Ok(names)
}

/// Create the target for `source` if missing, then apply its manifest.
pub fn load_defaults(
    ws: &mut Workspace,
    source: &str,
    git: &dyn GitClient,
    confirm: &dyn Confirm,
    fetch: FetchOptions,
) -> Result<()> {
    if !ws.config.sources.contains_key(source) {
        return Err(WorkspaceError::UnknownSource {
            name: source.to_string(),
        }
        .into());
    }

    if ws.targets_using_source(source).is_empty() {
        ws.config
            .targets
            .insert(source.to_string(), TargetConfiguration::cmake(""));
        tracing::info!("Added target {}", source);
    }

    process_source_manifest(ws, source, git, confirm, fetch)
}
