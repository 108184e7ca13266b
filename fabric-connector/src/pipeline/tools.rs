//! External tools and the two fabric flavors.

use serde::{Deserialize, Serialize};

/// Which fabric installation handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// The per-user install under `~/.local/bin`.
    #[default]
    Local,
    /// The alternate build (Go rewrite), installed outside the per-user layout.
    Alternate,
}

impl Flavor {
    /// Map the request's `alternate` flag to a flavor.
    pub fn from_alternate(alternate: bool) -> Self {
        if alternate {
            Self::Alternate
        } else {
            Self::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Alternate => "alternate",
        }
    }

    /// Flag that prints the available patterns.
    pub fn list_patterns_flag(&self) -> &'static str {
        match self {
            Self::Local => "--list",
            Self::Alternate => "--listpatterns",
        }
    }

    /// Flag that prints the available models.
    pub fn list_models_flag(&self) -> &'static str {
        "--listmodels"
    }

    /// Flag that changes the default model.
    pub fn change_default_model_flag(&self) -> &'static str {
        "--changeDefaultModel"
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locations of the external tools, in the layout the tools themselves see.
///
/// On Windows these are paths inside WSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub fabric: String,
    pub fabric_alternate: String,
    pub yt: String,
    pub whisper: String,
    pub whisper_model: String,
}

impl ToolPaths {
    /// Default install locations under a home directory.
    pub fn under_home(home: &str) -> Self {
        let home = home.trim_end_matches('/');
        Self {
            fabric: format!("{home}/.local/bin/fabric"),
            fabric_alternate: format!("{home}/go/bin/fabric"),
            yt: format!("{home}/.local/bin/yt"),
            whisper: format!("{home}/.local/bin/whisper"),
            whisper_model: "base".to_string(),
        }
    }

    pub fn fabric_for(&self, flavor: Flavor) -> &str {
        match flavor {
            Flavor::Local => &self.fabric,
            Flavor::Alternate => &self.fabric_alternate,
        }
    }
}
