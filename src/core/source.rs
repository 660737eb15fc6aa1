//! Code sources - where a source tree comes from.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating or resolving code sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("code source must have either git or local defined")]
    Empty,

    #[error("code source cannot have both git and local defined")]
    Ambiguous,

    #[error("git source has an empty repository URL")]
    EmptyRepository,

    #[error("local code sources are not allowed in remote context (`{}`)", path.display())]
    LocalNotAllowed { path: PathBuf },

    #[error("local source path does not exist: {}", path.display())]
    LocalMissing { path: PathBuf },

    #[error("cyclic source suggestion: {}", chain.join(" -> "))]
    SuggestionCycle { chain: Vec<String> },
}

/// A git repository, optionally pinned to a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    pub repository: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Provenance of a source tree.
///
/// On disk this is a mapping with exactly one of `git:` or `local:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCodeSource", into = "RawCodeSource")]
pub enum CodeSource {
    Git(GitSource),
    Local(PathBuf),
}

#[derive(Serialize, Deserialize)]
struct RawCodeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    git: Option<GitSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    local: Option<PathBuf>,
}

impl TryFrom<RawCodeSource> for CodeSource {
    type Error = SourceError;

    fn try_from(raw: RawCodeSource) -> Result<Self, Self::Error> {
        let local = raw.local.filter(|p| !p.as_os_str().is_empty());
        match (raw.git, local) {
            (Some(git), None) => Ok(CodeSource::Git(git)),
            (None, Some(path)) => Ok(CodeSource::Local(path)),
            (Some(_), Some(_)) => Err(SourceError::Ambiguous),
            (None, None) => Err(SourceError::Empty),
        }
    }
}

impl From<CodeSource> for RawCodeSource {
    fn from(source: CodeSource) -> Self {
        match source {
            CodeSource::Git(git) => RawCodeSource {
                git: Some(git),
                local: None,
            },
            CodeSource::Local(path) => RawCodeSource {
                git: None,
                local: Some(path),
            },
        }
    }
}

impl CodeSource {
    /// Create a git source.
    pub fn git(repository: impl Into<String>, revision: Option<String>) -> Self {
        CodeSource::Git(GitSource {
            repository: repository.into(),
            revision,
        })
    }

    /// Check that the source is usable.
    pub fn validate(&self) -> Result<(), SourceError> {
        match self {
            CodeSource::Git(git) if git.repository.trim().is_empty() => {
                Err(SourceError::EmptyRepository)
            }
            CodeSource::Local(path) if path.as_os_str().is_empty() => Err(SourceError::Empty),
            _ => Ok(()),
        }
    }

    /// Stricter validation for sources suggested by a fetched manifest.
    ///
    /// Untrusted input must never point at the local filesystem.
    pub fn validate_remote(&self) -> Result<(), SourceError> {
        self.validate()?;
        if let CodeSource::Local(path) = self {
            return Err(SourceError::LocalNotAllowed { path: path.clone() });
        }
        Ok(())
    }
}

impl fmt::Display for CodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSource::Git(GitSource {
                repository,
                revision: Some(rev),
            }) => write!(f, "{}@{}", repository, rev),
            CodeSource::Git(git) => f.write_str(&git.repository),
            CodeSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
