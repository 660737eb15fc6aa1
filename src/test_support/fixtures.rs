//! Workspace fixtures shared by unit tests.

use std::path::Path;

use crate::core::system::{Platform, Processor};
use crate::core::toolchain::{GenerateOptions, Toolchain, TOOLCHAIN_FILE};
use crate::core::workspace::Workspace;
use crate::core::host_key;

/// A workspace document with a git source, a local source, and a staged
/// dependency.
pub const SAMPLE_WORKSPACE: &str = r#"
sources:
  app:
    local: ../app
  fmt:
    git:
      repository: https://github.com/fmtlib/fmt.git
      revision: 10.2.1
targets:
  app:
    depends: [fmt]
    project_type: CMake
  fmt:
    depends:
    project_type: CMake
    staged: true
cxx_version: "20"
"#;

/// Write `SAMPLE_WORKSPACE` to `dir` and load it.
pub fn sample_workspace(dir: &Path) -> Workspace {
    std::fs::write(dir.join(crate::core::WORKSPACE_FILE), SAMPLE_WORKSPACE)
        .expect("failed to write workspace file");
    Workspace::load(dir).expect("failed to load sample workspace")
}

/// Write `toolchains/<name>/toolchain.yml` targeting linux/x64 that generates
/// a toolchain file on the current host.
pub fn write_generated_toolchain(ws: &Workspace, name: &str, c_compiler: &str, cxx_compiler: &str) {
    let toolchain = Toolchain::generated(
        Platform::Linux,
        Processor::X64,
        host_key(),
        GenerateOptions {
            c_compiler: c_compiler.to_string(),
            cxx_compiler: cxx_compiler.to_string(),
            ..Default::default()
        },
    );
    toolchain
        .write(&ws.toolchains_dir().join(name).join(TOOLCHAIN_FILE))
        .expect("failed to write toolchain");
}

/// A source manifest suggesting one git dependency.
pub fn manifest_suggesting(dep: &str, repository: &str) -> String {
    format!(
        r#"default_configuration:
  project_type: CMake
  staged: true
suggested_dep_sources:
  {dep}:
    git:
      repository: {repository}
"#
    )
}
