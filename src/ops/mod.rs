//! High-level operations.
//!
//! This module contains the implementation of cbuild commands.

pub mod cbuild_build;
pub mod cbuild_clean;
pub mod cbuild_edit;
pub mod cbuild_fetch;
pub mod cbuild_init;
pub mod detect_toolchains;
pub mod get_args;
pub mod list_sources;
pub mod resolve;

pub use cbuild_build::{build, BuildDriver, BuildMode, BuildOptions, ALL_TOOLCHAINS};
pub use cbuild_clean::clean;
pub use cbuild_fetch::{download, git_clone, load_defaults, DownloadOptions};
pub use cbuild_init::{init_workspace, InitOptions};
pub use detect_toolchains::detect_toolchains;
pub use get_args::get_build_args;
pub use list_sources::{list_sources, SourceEntry, SourceState};
pub use resolve::{process_source_manifest, AutoConfirm, Confirm, PromptConfirm, SuggestionResolver};
