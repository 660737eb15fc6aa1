//! Build parameters - which toolchain and configuration a build runs with.

use std::fmt;

/// One (toolchain, configuration) combination of a build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
    /// Toolchain name, a directory under `toolchains/`.
    pub toolchain: String,

    /// Configuration name, e.g. `Debug`.
    pub configuration: String,

    /// Log commands instead of running them.
    pub dry_run: bool,
}

impl BuildParameters {
    pub fn new(toolchain: impl Into<String>, configuration: impl Into<String>) -> Self {
        BuildParameters {
            toolchain: toolchain.into(),
            configuration: configuration.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Display for BuildParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.toolchain, self.configuration)
    }
}
