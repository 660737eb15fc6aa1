//! MSVC flag vocabulary.
//!
//! Sanitizer and coverage presets have no MSVC flags wired in; they fall back
//! to their base preset and are not registered.

use super::{BuildPreset, PresetFlags};

#[derive(Debug, Clone, Copy)]
pub struct MsvcFlags;

impl PresetFlags for MsvcFlags {
    fn supported_presets(&self) -> &'static [BuildPreset] {
        &BuildPreset::BASE
    }

    fn preset_flags(&self, preset: BuildPreset) -> Vec<String> {
        let flags: &[&str] = match preset {
            BuildPreset::Debug
            | BuildPreset::DebugCoverage
            | BuildPreset::DebugAsan
            | BuildPreset::DebugTsan => &["/Zi", "/Od", "/RTC1"],
            BuildPreset::Release | BuildPreset::ReleaseAsan | BuildPreset::ReleaseTsan => {
                &["/O2", "/DNDEBUG"]
            }
            BuildPreset::Quick => &["/O1", "/DNDEBUG"],
            BuildPreset::RelWithDebInfo | BuildPreset::Profile => &["/O2", "/Zi", "/DNDEBUG"],
        };
        flags.iter().map(|f| f.to_string()).collect()
    }
}
