//! Runtime configuration.
//!
//! Everything comes from environment variables (optionally loaded from a
//! `.env` file by the binary) with defaults derived from the user's home
//! directory and the host platform.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::api::server::ApiServerConfig;
use crate::pipeline::paths::{PrefixRewrite, to_wsl_home};
use crate::pipeline::{Platform, ToolPaths};
use crate::{Error, Result};

/// Default per-invocation timeout.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;

/// Default bounded wait for in-flight requests on stop.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Where the alternate build lives inside WSL, relative to the user's home.
const DEFAULT_ALTERNATE_PREFIX_TO: &str = "/root";

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub platform: Platform,
    pub server: ApiServerConfig,
    pub tools: ToolPaths,
    /// Applied to the alternate fabric path on Windows only.
    pub alternate_rewrite: Option<PrefixRewrite>,
    /// `None` disables the timeout.
    pub tool_timeout: Option<Duration>,
    pub staging_dir: PathBuf,
    pub whisper_output_root: PathBuf,
    pub log_dir: PathBuf,
    pub shutdown_grace: Duration,
}

impl ConnectorConfig {
    /// Load configuration from the process environment.
    pub fn from_env_or_default(platform: Platform) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::config("Cannot determine the user's home directory"))?;
        Ok(Self::from_vars(platform, &home.to_string_lossy(), |key| {
            std::env::var(key).ok()
        }))
    }

    /// Log directory from `LOG_DIR`, defaulting to `logs`.
    ///
    /// Read separately so logging is installed before anything else is parsed.
    pub fn log_dir_from_vars<F>(var: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        var("LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// `native_home` is the home directory as the host OS reports it.
    pub fn from_vars<F>(platform: Platform, native_home: &str, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        // Tools are addressed in their own layout: the WSL home on Windows.
        let tool_home = match platform {
            Platform::Unix => native_home.trim_end_matches('/').to_string(),
            Platform::Windows => to_wsl_home(native_home),
        };

        let mut tools = ToolPaths::under_home(&tool_home);
        if let Some(path) = var("FABRIC_PATH") {
            tools.fabric = path;
        }
        if let Some(path) = var("FABRIC_ALT_PATH") {
            tools.fabric_alternate = path;
        }
        if let Some(path) = var("YT_PATH") {
            tools.yt = path;
        }
        if let Some(path) = var("WHISPER_PATH") {
            tools.whisper = path;
        }
        if let Some(model) = var("WHISPER_MODEL") {
            tools.whisper_model = model;
        }

        let alternate_rewrite = match platform {
            Platform::Unix => None,
            Platform::Windows => Some(PrefixRewrite::new(
                var("FABRIC_ALT_PREFIX_FROM").unwrap_or_else(|| tool_home.clone()),
                var("FABRIC_ALT_PREFIX_TO")
                    .unwrap_or_else(|| DEFAULT_ALTERNATE_PREFIX_TO.to_string()),
            )),
        };

        let timeout_secs = parse_or_default(
            "TOOL_TIMEOUT_SECS",
            var("TOOL_TIMEOUT_SECS"),
            DEFAULT_TOOL_TIMEOUT_SECS,
        );
        let grace_secs = parse_or_default(
            "SHUTDOWN_GRACE_SECS",
            var("SHUTDOWN_GRACE_SECS"),
            DEFAULT_SHUTDOWN_GRACE_SECS,
        );

        let temp = std::env::temp_dir();

        Self {
            platform,
            server: ApiServerConfig::from_vars(&var),
            tools,
            alternate_rewrite,
            tool_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            staging_dir: var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| temp.clone()),
            whisper_output_root: var("WHISPER_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| temp.join("fabric-connector-whisper")),
            log_dir: Self::log_dir_from_vars(&var),
            shutdown_grace: Duration::from_secs(grace_secs),
        }
    }
}

fn parse_or_default(key: &str, value: Option<String>, default: u64) -> u64 {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default, "Invalid numeric setting, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_logs;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unix_defaults() {
        let config = ConnectorConfig::from_vars(Platform::Unix, "/Users/chase", vars(&[]));
        assert_eq!(config.tools.fabric, "/Users/chase/.local/bin/fabric");
        assert_eq!(config.tools.yt, "/Users/chase/.local/bin/yt");
        assert!(config.alternate_rewrite.is_none());
        assert_eq!(config.tool_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.server.port, 49152);
        assert_eq!(config.server.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_windows_defaults_use_wsl_layout() {
        let config = ConnectorConfig::from_vars(Platform::Windows, r"C:\Users\chase", vars(&[]));
        assert_eq!(config.tools.fabric, "/home/chase/.local/bin/fabric");
        assert_eq!(config.tools.fabric_alternate, "/home/chase/go/bin/fabric");
        assert_eq!(
            config.alternate_rewrite,
            Some(PrefixRewrite::new("/home/chase", "/root"))
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = ConnectorConfig::from_vars(
            Platform::Unix,
            "/home/me",
            vars(&[
                ("FABRIC_PATH", "/opt/fabric"),
                ("WHISPER_MODEL", "small"),
                ("TOOL_TIMEOUT_SECS", "0"),
                ("SHUTDOWN_GRACE_SECS", "3"),
                ("API_PORT", "8080"),
                ("LOG_DIR", "/var/log/fc"),
            ]),
        );
        assert_eq!(config.tools.fabric, "/opt/fabric");
        assert_eq!(config.tools.whisper_model, "small");
        assert_eq!(config.tool_timeout, None);
        assert_eq!(config.shutdown_grace, Duration::from_secs(3));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/fc"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let (config, logs) = capture_logs(|| {
            ConnectorConfig::from_vars(
                Platform::Unix,
                "/home/me",
                vars(&[("TOOL_TIMEOUT_SECS", "soon"), ("API_PORT", "99999")]),
            )
        });
        assert_eq!(config.tool_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.server.port, 49152);
        assert!(logs.contains("TOOL_TIMEOUT_SECS"));
        assert!(logs.contains("Invalid port, using default"));
        assert!(logs.contains("99999"));
    }

    #[test]
    fn test_log_dir_resolves_on_its_own() {
        assert_eq!(
            ConnectorConfig::log_dir_from_vars(vars(&[])),
            PathBuf::from("logs")
        );
        assert_eq!(
            ConnectorConfig::log_dir_from_vars(vars(&[("LOG_DIR", " ")])),
            PathBuf::from("logs")
        );
        assert_eq!(
            ConnectorConfig::log_dir_from_vars(vars(&[("LOG_DIR", "/var/log/fc")])),
            PathBuf::from("/var/log/fc")
        );
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config =
            ConnectorConfig::from_vars(Platform::Unix, "/home/me", vars(&[("FABRIC_PATH", "  ")]));
        assert_eq!(config.tools.fabric, "/home/me/.local/bin/fabric");
    }
}
