//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod detect_toolchains;
pub mod edit;
pub mod fetch;
pub mod get_args;
pub mod init;
pub mod list_sources;
