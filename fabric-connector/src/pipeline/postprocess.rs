//! Post-processing of transcript tool output.

use std::sync::LazyLock;

use regex::Regex;

/// `[MM:SS.mmm --> MM:SS.mmm]` with an optional leading hours field.
static TIMESTAMP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\d+:\d{2}(?::\d{2})?\.\d{3} --> \d+:\d{2}(?::\d{2})?\.\d{3}\]").unwrap()
});

/// Keep only the lines that start with a timestamp range.
///
/// Progress banners and language-detection notices are dropped. Returns an
/// empty string when nothing matches.
pub fn extract_timestamped_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| TIMESTAMP_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}
