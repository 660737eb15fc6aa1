//! Shared utilities

pub mod fs;
pub mod process;
pub mod shell;
pub mod yaml;

pub use shell::{ColorChoice, Shell, Status, Verbosity};
