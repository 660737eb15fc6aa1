//! Test doubles for the collaborators the library talks to.
//!
//! `RecordingRunner` stands in for CMake, `FakeGitClient` for git, and
//! `ScriptedConfirm` for the interactive prompt.

pub mod fixtures;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::ops::resolve::Confirm;
use crate::sources::GitClient;
use crate::util::process::{CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// Records every command instead of running it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// A runner that fails the first command containing `needle`.
    pub fn failing_on(needle: &str) -> Self {
        RecordingRunner {
            commands: Mutex::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    /// Recorded command lines, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        let line = cmd.display_command();
        self.commands.lock().unwrap().push(line.clone());

        if let Some(ref needle) = self.fail_on {
            if line.contains(needle.as_str()) {
                bail!("`{}` failed with exit code Some(1)", line);
            }
        }
        Ok(())
    }
}

/// A git client that materializes canned trees instead of cloning.
#[derive(Debug, Default)]
pub struct FakeGitClient {
    calls: Mutex<Vec<String>>,
    trees: HashMap<String, Vec<(String, String)>>,
    failing: HashSet<String>,
}

impl FakeGitClient {
    pub fn new() -> Self {
        FakeGitClient::default()
    }

    /// Files written into the checkout whenever `repository` is fetched.
    pub fn with_tree(mut self, repository: &str, files: &[(&str, &str)]) -> Self {
        self.trees.insert(
            repository.to_string(),
            files
                .iter()
                .map(|(path, contents)| (path.to_string(), contents.to_string()))
                .collect(),
        );
        self
    }

    /// Make every fetch of `repository` fail.
    pub fn failing(mut self, repository: &str) -> Self {
        self.failing.insert(repository.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn materialize(&self, repository: &str, dest: &Path) -> Result<()> {
        if self.failing.contains(repository) {
            bail!("failed to clone {}", repository);
        }

        std::fs::create_dir_all(dest)?;
        for (path, contents) in self.trees.get(repository).into_iter().flatten() {
            let file = dest.join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(file, contents)?;
        }
        Ok(())
    }
}

impl GitClient for FakeGitClient {
    fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("clone {} {}", repository, dest.display()));
        self.materialize(repository, dest)
    }

    fn submodule_add(&self, workspace_root: &Path, repository: &str, path: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(format!(
            "submodule-add {} {} {}",
            workspace_root.display(),
            repository,
            path.display()
        ));
        self.materialize(repository, &workspace_root.join(path))
    }

    fn checkout(&self, repo_dir: &Path, revision: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("checkout {} {}", repo_dir.display(), revision));
        Ok(())
    }
}

/// Answers prompts from a script; records what was asked.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        ScriptedConfirm {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("unexpected prompt: {}", prompt),
        }
    }
}
