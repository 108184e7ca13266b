//! Platform invocation strategies.
//!
//! A strategy turns "run tool T in flavor F with these arguments" into an
//! [`InvocationPlan`]. One strategy is selected at startup from the detected
//! [`Platform`] and shared by every request.

mod native;
mod wsl;

use std::path::Path;
use std::sync::Arc;

pub use native::NativeStrategy;
pub use wsl::WslStrategy;

use super::paths::PrefixRewrite;
use super::plan::InvocationPlan;
use super::platform::Platform;
use super::tools::{Flavor, ToolPaths};

/// Text longer than this is staged instead of passed inline.
///
/// Linux caps a single argument at 128 KiB; staying well below keeps room
/// for multi-byte text.
pub const DEFAULT_INLINE_TEXT_LIMIT: usize = 64 * 1024;

/// Maps logical tool calls to concrete invocation plans.
pub trait InvocationStrategy: Send + Sync {
    /// Platform this strategy targets.
    fn platform(&self) -> Platform;

    /// Run one fabric pattern over `input`.
    fn transform(&self, flavor: Flavor, step: &str, model: &str, input: &str) -> InvocationPlan;

    /// Fetch the transcript of a video URL.
    fn transcript(&self, url: &str) -> InvocationPlan;

    /// Transcribe a media file, writing artifacts into `output_dir`.
    fn speech_to_text(&self, media: &Path, output_dir: &Path) -> InvocationPlan;

    /// Run fabric with plain arguments (listings, default-model changes).
    fn fabric_query(&self, flavor: Flavor, args: &[&str]) -> InvocationPlan;
}

/// Settings shared by every strategy.
#[derive(Debug, Clone)]
pub struct StrategySettings {
    pub tools: ToolPaths,
    /// Applied to the alternate fabric path on Windows.
    pub alternate_rewrite: Option<PrefixRewrite>,
    pub inline_text_limit: usize,
}

impl StrategySettings {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            alternate_rewrite: None,
            inline_text_limit: DEFAULT_INLINE_TEXT_LIMIT,
        }
    }

    pub fn with_alternate_rewrite(mut self, rewrite: Option<PrefixRewrite>) -> Self {
        self.alternate_rewrite = rewrite;
        self
    }
}

/// Build the strategy for a platform.
pub fn for_platform(platform: Platform, settings: StrategySettings) -> Arc<dyn InvocationStrategy> {
    match platform {
        Platform::Unix => Arc::new(NativeStrategy::new(settings)),
        Platform::Windows => Arc::new(WslStrategy::new(settings)),
    }
}

/// `fabric -sp <step> [--model <model>]`, without the text payload.
fn fabric_transform_argv(fabric: &str, step: &str, model: &str) -> Vec<String> {
    let mut argv = vec![fabric.to_string(), "-sp".to_string(), step.to_string()];
    let model = model.trim();
    if !model.is_empty() {
        argv.push("--model".to_string());
        argv.push(model.to_string());
    }
    argv
}

fn yt_argv(yt: &str, url: &str) -> Vec<String> {
    vec![yt.to_string(), "--transcript".to_string(), url.to_string()]
}

fn whisper_argv(tools: &ToolPaths, media: String, output_dir: String) -> Vec<String> {
    vec![
        tools.whisper.clone(),
        media,
        "--model".to_string(),
        tools.whisper_model.clone(),
        "--output_dir".to_string(),
        output_dir,
    ]
}

fn query_argv(fabric: &str, args: &[&str]) -> Vec<String> {
    std::iter::once(fabric)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}
