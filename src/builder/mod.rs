//! External build-tool integration.
//!
//! CMake command lines for targets, and toolchain-file generation.

pub mod cmake;
pub mod context;
pub mod toolchain;

pub use cmake::CMake;
pub use context::BuildParameters;
pub use toolchain::{generate_toolchain_file, CompilerFamily, GenerateRequest, ToolchainError};
