//! Path translation across the WSL boundary.
//!
//! Native Windows paths (`C:\Users\me\clip.mp3`) are not meaningful to tools
//! running inside WSL. Two mappings exist:
//! - a user's Windows profile maps to their WSL home (`C:\Users\me` -> `/home/me`),
//!   which is where the tools are installed;
//! - any other drive path maps to the automount (`D:\x` -> `/mnt/d/x`).

/// Translate a native Windows path to the WSL automount layout.
///
/// Paths that are already POSIX-style are returned unchanged.
pub fn to_wsl_mount(native: &str) -> String {
    if native.starts_with('/') {
        return native.to_string();
    }

    let bytes = native.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        let rest = native[2..].replace('\\', "/");
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return format!("/mnt/{drive}");
        }
        return format!("/mnt/{drive}/{rest}");
    }

    native.replace('\\', "/")
}

/// Translate a native Windows profile directory to the WSL home directory.
///
/// `C:\Users\me` becomes `/home/me`. Anything outside `\Users\` falls back to
/// [`to_wsl_mount`].
pub fn to_wsl_home(native_home: &str) -> String {
    let normalized = native_home.replace('\\', "/");
    let without_drive = match normalized.as_bytes() {
        [d, b':', ..] if d.is_ascii_alphabetic() => &normalized[2..],
        _ => normalized.as_str(),
    };

    match without_drive.strip_prefix("/Users/") {
        Some(rest) if !rest.is_empty() => format!("/home/{}", rest.trim_end_matches('/')),
        _ => to_wsl_mount(native_home),
    }
}

/// Replace a leading path prefix, respecting component boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
    pub from: String,
    pub to: String,
}

impl PrefixRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Apply the rewrite. Paths that do not start with `from` are unchanged.
    pub fn apply(&self, path: &str) -> String {
        let from = self.from.trim_end_matches('/');
        if from.is_empty() {
            return path.to_string();
        }
        match path.strip_prefix(from) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                format!("{}{}", self.to.trim_end_matches('/'), rest)
            }
            _ => path.to_string(),
        }
    }
}
