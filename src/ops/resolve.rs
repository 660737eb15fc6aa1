//! Applying a source's manifest and fetching the dependencies it suggests.
//!
//! When a source ships a manifest, every target built from it takes the
//! manifest's default configuration. Each suggested dependency that has no
//! target yet is fetched (after confirmation), given a target, wired in as a
//! dependency, and then resolved in turn.

use anyhow::{Context, Result};

use crate::core::manifest::SourceManifest;
use crate::core::source::SourceError;
use crate::core::target::TargetConfiguration;
use crate::core::workspace::Workspace;
use crate::sources::{fetch_source, FetchOptions, GitClient};

/// Decides whether a suggested dependency should be downloaded.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Accepts every suggestion (`--download-deps`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        tracing::debug!("auto-accepting: {}", prompt);
        Ok(true)
    }
}

/// Asks on the terminal; the default answer is yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        inquire::Confirm::new(prompt)
            .with_default(true)
            .prompt()
            .context("failed to read confirmation")
    }
}

/// Resolves manifests recursively, guarding against suggestion cycles.
pub struct SuggestionResolver<'a> {
    git: &'a dyn GitClient,
    confirm: &'a dyn Confirm,
    fetch: FetchOptions,
    resolving: Vec<String>,
}

impl<'a> SuggestionResolver<'a> {
    pub fn new(git: &'a dyn GitClient, confirm: &'a dyn Confirm, fetch: FetchOptions) -> Self {
        SuggestionResolver {
            git,
            confirm,
            fetch,
            resolving: Vec::new(),
        }
    }

    /// Apply the manifest of `source`, if it has one. Does not save.
    pub fn process(&mut self, ws: &mut Workspace, source: &str) -> Result<()> {
        if let Some(pos) = self.resolving.iter().position(|s| s == source) {
            let mut chain = self.resolving[pos..].to_vec();
            chain.push(source.to_string());
            return Err(SourceError::SuggestionCycle { chain }.into());
        }

        self.resolving.push(source.to_string());
        let result = self.process_manifest(ws, source);
        self.resolving.pop();
        result
    }

    fn process_manifest(&mut self, ws: &mut Workspace, source: &str) -> Result<()> {
        let dir = ws.source_dir(source);
        let Some(manifest) = SourceManifest::load_from_dir(&dir)? else {
            tracing::debug!("no manifest in {}", dir.display());
            return Ok(());
        };

        tracing::info!("Applying manifest of {}", source);
        apply_default_configuration(ws, source, &manifest.default_configuration);

        for (dep, suggested) in &manifest.suggested_dep_sources {
            if ws.config.targets.contains_key(dep) {
                continue;
            }

            suggested
                .validate_remote()
                .with_context(|| format!("source `{}` suggests an invalid source for `{}`", source, dep))?;

            let prompt = format!(
                "Dependency '{}' is not present in sources, source '{}' suggests getting it from '{}', download it?",
                dep, source, suggested
            );
            if !self.confirm.confirm(&prompt)? {
                tracing::info!("Skipping {}", dep);
                continue;
            }

            ws.config.sources.insert(dep.clone(), suggested.clone());
            fetch_source(ws, dep, suggested, self.git, self.fetch)
                .with_context(|| format!("failed to fetch dependency {}", dep))?;

            ws.config.targets.insert(
                dep.clone(),
                TargetConfiguration {
                    source: dep.clone(),
                    ..Default::default()
                },
            );
            tracing::info!("Added target {}", dep);

            for user in ws.targets_using_source(source) {
                if user != *dep {
                    ws.add_dependency(&user, dep)?;
                }
            }

            self.process(ws, dep)
                .with_context(|| format!("failed to set up dependency {}", dep))?;
        }

        Ok(())
    }
}

/// Replace the configuration of every target built from `source`, keeping
/// each target's source name and external override.
fn apply_default_configuration(ws: &mut Workspace, source: &str, defaults: &TargetConfiguration) {
    for name in ws.targets_using_source(source) {
        if let Ok(config) = ws.target_mut(&name) {
            let mut replacement = defaults.clone();
            replacement.source = std::mem::take(&mut config.source);
            replacement.external_source_override = config.external_source_override.take();
            *config = replacement;
        }
    }
}

/// Apply the manifest of `source` and save the workspace.
pub fn process_source_manifest(
    ws: &mut Workspace,
    source: &str,
    git: &dyn GitClient,
    confirm: &dyn Confirm,
    fetch: FetchOptions,
) -> Result<()> {
    SuggestionResolver::new(git, confirm, fetch).process(ws, source)?;
    ws.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::CodeSource;
    use crate::test_support::{manifest_suggesting, FakeGitClient, ScriptedConfirm};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn workspace_with_source(tmp: &TempDir, manifest: &str) -> Workspace {
        let mut ws = Workspace::empty(tmp.path());
        ws.config.sources.insert(
            "app".into(),
            CodeSource::git("https://example.com/app.git", None),
        );
        ws.config.targets.insert("app".into(), TargetConfiguration::default());

        let dir = ws.source_dir("app");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("csetup.yml"), manifest).unwrap();
        ws
    }

    #[test]
    fn test_defaults_keep_overrides() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(
            &tmp,
            "default_configuration:\n  project_type: CMake\n  cmake_package_name: App\n",
        );

        let mut variant = TargetConfiguration::cmake("app");
        variant.external_source_override = Some(PathBuf::from("/elsewhere/app"));
        variant.cxx_standard = Some("17".into());
        ws.config.targets.insert("app-tests".into(), variant);

        let git = FakeGitClient::new();
        let confirm = ScriptedConfirm::new(&[]);
        process_source_manifest(&mut ws, "app", &git, &confirm, FetchOptions::default()).unwrap();

        let app = &ws.config.targets["app"];
        assert_eq!(app.cmake_package_name.as_deref(), Some("App"));
        assert!(app.source.is_empty());

        let variant = &ws.config.targets["app-tests"];
        assert_eq!(variant.source, "app");
        assert_eq!(variant.external_source_override, Some(PathBuf::from("/elsewhere/app")));
        assert_eq!(variant.cxx_standard, None);
        assert!(ws.workspace_file().is_file());
    }

    #[test]
    fn test_suggestions_resolve_transitively() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(&tmp, &manifest_suggesting("fmt", "https://example.com/fmt.git"));

        let fmt_manifest = manifest_suggesting("zlib", "https://example.com/zlib.git");
        let git = FakeGitClient::new()
            .with_tree("https://example.com/fmt.git", &[("CSetupLists.yml", fmt_manifest.as_str())])
            .with_tree("https://example.com/zlib.git", &[("CMakeLists.txt", "")]);
        let confirm = ScriptedConfirm::new(&[true, true]);

        process_source_manifest(&mut ws, "app", &git, &confirm, FetchOptions::default()).unwrap();

        assert_eq!(ws.config.targets["app"].depends, vec!["fmt"]);
        assert_eq!(ws.config.targets["fmt"].depends, vec!["zlib"]);
        assert!(ws.config.targets["fmt"].is_staged());
        assert_eq!(ws.config.targets["zlib"].source, "zlib");
        assert!(ws.config.sources.contains_key("zlib"));
        assert!(ws.source_dir("zlib").join("CMakeLists.txt").is_file());

        let prompts = confirm.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(
            prompts[0],
            "Dependency 'fmt' is not present in sources, source 'app' suggests getting it from 'https://example.com/fmt.git', download it?"
        );

        let saved = Workspace::load(tmp.path()).unwrap();
        assert!(saved.config.targets.contains_key("zlib"));
    }

    #[test]
    fn test_declined_suggestion_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(&tmp, &manifest_suggesting("fmt", "https://example.com/fmt.git"));
        let git = FakeGitClient::new();
        let confirm = ScriptedConfirm::new(&[false]);

        process_source_manifest(&mut ws, "app", &git, &confirm, FetchOptions::default()).unwrap();

        assert!(git.calls().is_empty());
        assert!(!ws.config.targets.contains_key("fmt"));
        assert!(ws.config.targets["app"].depends.is_empty());
    }

    #[test]
    fn test_existing_target_is_not_prompted() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(&tmp, &manifest_suggesting("fmt", "https://example.com/fmt.git"));
        ws.config.targets.insert("fmt".into(), TargetConfiguration::default());
        let confirm = ScriptedConfirm::new(&[]);

        process_source_manifest(&mut ws, "app", &FakeGitClient::new(), &confirm, FetchOptions::default())
            .unwrap();
        assert!(confirm.prompts().is_empty());
    }

    #[test]
    fn test_local_suggestion_rejected_before_fetch() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(
            &tmp,
            "suggested_dep_sources:\n  secrets:\n    local: /etc\n",
        );
        let git = FakeGitClient::new();
        let confirm = ScriptedConfirm::new(&[]);

        let err = process_source_manifest(&mut ws, "app", &git, &confirm, FetchOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::LocalNotAllowed { .. })
        ));
        assert!(git.calls().is_empty());
        assert!(confirm.prompts().is_empty());
        assert!(!ws.config.sources.contains_key("secrets"));
    }

    #[test]
    fn test_fetch_failure_names_dependency() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace_with_source(&tmp, &manifest_suggesting("fmt", "https://example.com/fmt.git"));
        let git = FakeGitClient::new().failing("https://example.com/fmt.git");

        let err = process_source_manifest(&mut ws, "app", &git, &AutoConfirm, FetchOptions::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to fetch dependency fmt"));
    }

    #[test]
    fn test_self_suggestion_is_a_cycle() {
        let tmp = TempDir::new().unwrap();
        let mut ws = Workspace::empty(tmp.path());
        ws.config.targets.insert("app-core".into(), TargetConfiguration::cmake("core"));
        let dir = ws.source_dir("core");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("csetup.yml"),
            manifest_suggesting("core", "https://example.com/core.git"),
        )
        .unwrap();

        let err = SuggestionResolver::new(&FakeGitClient::new(), &AutoConfirm, FetchOptions::default())
            .process(&mut ws, "core")
            .unwrap_err();
        match err.downcast_ref::<SourceError>() {
            Some(SourceError::SuggestionCycle { chain }) => {
                assert_eq!(chain, &vec!["core".to_string(), "core".into()]);
            }
            other => panic!("expected a suggestion cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_source_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let mut ws = Workspace::empty(tmp.path());
        ws.config.targets.insert("zlib".into(), TargetConfiguration::cmake(""));

        SuggestionResolver::new(&FakeGitClient::new(), &AutoConfirm, FetchOptions::default())
            .process(&mut ws, "zlib")
            .unwrap();
        assert_eq!(ws.config.targets["zlib"], TargetConfiguration::cmake(""));
    }
}
