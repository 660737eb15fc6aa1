//! Implementation of `cbuild get-args`: the configure arguments of a target,
//! for use with an IDE or a hand-run CMake.

use anyhow::Result;

use crate::builder::cmake::{configure_args, strip_source_and_build};
use crate::builder::context::BuildParameters;
use crate::core::toolchain::LoadedToolchain;
use crate::core::workspace::Workspace;
use crate::core::host_key;

pub const DEFAULT_TOOLCHAIN: &str = "default";
pub const DEFAULT_CONFIGURATION: &str = "Debug";

/// Configure arguments for `target` without the `-S`/`-B` pairs.
///
/// A toolchain that doesn't exist contributes no toolchain file.
pub fn get_build_args(
    ws: &Workspace,
    target: &str,
    toolchain: &str,
    configuration: &str,
) -> Result<Vec<String>> {
    let target = ws.target(target)?;
    let bp = BuildParameters::new(toolchain, configuration);

    let toolchain_file = if LoadedToolchain::exists(ws, toolchain) {
        LoadedToolchain::load(ws, toolchain)?.toolchain_file(ws, &host_key())
    } else {
        tracing::debug!("toolchain `{}` not found; omitting toolchain file", toolchain);
        None
    };

    let args = configure_args(ws, &target, &bp, toolchain_file.as_deref())?;
    Ok(strip_source_and_build(&args))
}
