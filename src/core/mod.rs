//! Core data structures for cbuild.
//!
//! This module contains the persisted workspace model:
//! - Platform and processor enumerations
//! - Code sources and per-source manifests
//! - Targets and toolchain descriptors
//! - The workspace document itself

pub mod manifest;
pub mod source;
pub mod system;
pub mod target;
pub mod toolchain;
pub mod workspace;

pub use manifest::SourceManifest;
pub use source::{CodeSource, GitSource, SourceError};
pub use system::{host_key, Platform, Processor};
pub use target::{CMakeOption, TargetConfiguration, TargetContext};
pub use toolchain::{LoadedToolchain, Toolchain};
pub use workspace::{find_workspace_root, Workspace, WorkspaceConfig, WorkspaceError, WORKSPACE_FILE};
