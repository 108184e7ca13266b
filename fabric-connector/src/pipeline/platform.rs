//! Host platform detection.

use serde::Serialize;

use crate::{Error, Result};

/// Platform the connector is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS, Linux and the BSDs. Tools are invoked directly.
    Unix,
    /// Windows. Tools live inside WSL and are reached through `wsl -e`.
    Windows,
}

impl Platform {
    /// Detect the platform of the running process.
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a supported platform.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "macos" | "linux" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" => Ok(Self::Unix),
            "windows" => Ok(Self::Windows),
            other => Err(Error::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
