//! Target platform and processor model.
//!
//! Both enums serialize as lowercase canonical names and accept the common
//! aliases used by compilers and CMake when parsed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Operating system a toolchain targets (or the host runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
    FreeBSD,
}

impl Platform {
    /// Canonical lowercase name, used for on-disk keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "mac",
            Platform::Linux => "linux",
            Platform::FreeBSD => "freebsd",
        }
    }

    /// Detect the platform this binary is running on.
    pub fn host() -> Option<Platform> {
        match std::env::consts::OS {
            "linux" => Some(Platform::Linux),
            "macos" => Some(Platform::Mac),
            "windows" => Some(Platform::Windows),
            "freebsd" => Some(Platform::FreeBSD),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win32" => Ok(Platform::Windows),
            "mac" | "macos" | "darwin" => Ok(Platform::Mac),
            "linux" => Ok(Platform::Linux),
            "freebsd" => Ok(Platform::FreeBSD),
            _ => Err(format!("unrecognized platform `{}`", s)),
        }
    }
}

/// CPU architecture a toolchain targets (or the host runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Processor {
    X86,
    X64,
    Arm32,
    Arm64,
    RiscV32,
    RiscV64,
}

impl Processor {
    /// Canonical lowercase name, used for on-disk keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::X86 => "x86",
            Processor::X64 => "x64",
            Processor::Arm32 => "arm",
            Processor::Arm64 => "arm64",
            Processor::RiscV32 => "riscv32",
            Processor::RiscV64 => "riscv64",
        }
    }

    /// Detect the processor this binary is running on.
    pub fn host() -> Option<Processor> {
        match std::env::consts::ARCH {
            "x86" => Some(Processor::X86),
            "x86_64" => Some(Processor::X64),
            "arm" => Some(Processor::Arm32),
            "aarch64" => Some(Processor::Arm64),
            "riscv32" => Some(Processor::RiscV32),
            "riscv64" => Some(Processor::RiscV64),
            _ => None,
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Processor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(Processor::X86),
            "x64" | "x86_64" | "amd64" => Ok(Processor::X64),
            "arm" | "arm32" | "armv7l" => Ok(Processor::Arm32),
            "arm64" | "aarch64" => Ok(Processor::Arm64),
            "riscv32" => Ok(Processor::RiscV32),
            "riscv64" => Ok(Processor::RiscV64),
            _ => Err(format!("unrecognized processor `{}`", s)),
        }
    }
}

macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_str!(Platform);
serde_via_str!(Processor);

/// Key under which a toolchain descriptor stores per-host settings,
/// e.g. `host-linux-x64`.
pub fn host_key() -> String {
    format!(
        "host-{}-{}",
        Platform::host().map_or("unknown", |p| p.as_str()),
        Processor::host().map_or("unknown", |p| p.as_str())
    )
}
