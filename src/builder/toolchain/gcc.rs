//! GCC/Clang flag vocabulary.

use std::path::Path;

use super::{BuildPreset, PresetFlags};

/// Preset flags shared by GCC and Clang.
#[derive(Debug, Clone)]
pub struct GccFlags {
    clang: bool,
    /// `-fdebug-prefix-map=<workspace>=.`
    prefix_map: String,
}

impl GccFlags {
    pub fn new(clang: bool, workspace_dir: &Path) -> Self {
        GccFlags {
            clang,
            prefix_map: format!("-fdebug-prefix-map={}=.", workspace_dir.display()),
        }
    }

    fn debug(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.clang {
            flags.push("-fdebug-compilation-dir=.".to_string());
        }
        flags.push(self.prefix_map.clone());
        flags.extend(owned(&["-g", "-Og"]));
        flags
    }
}

const RELEASE: &[&str] = &["-O3", "-DNDEBUG"];
const QUICK: &[&str] = &["-O1", "-DNDEBUG"];
const PROFILE: &[&str] = &["-O3", "-g", "-DNDEBUG"];
const ASAN: &[&str] = &["-fsanitize=address", "-fsanitize=undefined"];
const TSAN: &[&str] = &["-fsanitize=thread", "-fsanitize=undefined"];

fn owned(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|f| f.to_string()).collect()
}

impl PresetFlags for GccFlags {
    fn supported_presets(&self) -> &'static [BuildPreset] {
        &BuildPreset::ALL
    }

    fn preset_flags(&self, preset: BuildPreset) -> Vec<String> {
        let with = |mut base: Vec<String>, extra: &[&str]| {
            base.extend(owned(extra));
            base
        };

        match preset {
            BuildPreset::Debug => self.debug(),
            BuildPreset::Release => owned(RELEASE),
            BuildPreset::Quick => owned(QUICK),
            BuildPreset::RelWithDebInfo | BuildPreset::Profile => owned(PROFILE),
            BuildPreset::DebugCoverage => with(self.debug(), &["--coverage"]),
            BuildPreset::DebugAsan => with(self.debug(), ASAN),
            BuildPreset::DebugTsan => with(self.debug(), TSAN),
            BuildPreset::ReleaseAsan => with(owned(RELEASE), ASAN),
            BuildPreset::ReleaseTsan => with(owned(RELEASE), TSAN),
        }
    }
}
