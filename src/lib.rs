//! cbuild - a meta-build orchestrator for CMake workspaces
//!
//! A workspace holds source checkouts and build targets. cbuild resolves
//! target dependencies, generates per-toolchain CMake toolchain files, and
//! drives configure, build, and install for every target in dependency order.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test doubles for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    source::CodeSource, target::TargetConfiguration, target::TargetContext, workspace::Workspace,
};
