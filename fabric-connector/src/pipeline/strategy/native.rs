//! Direct invocation on Unix hosts.

use std::path::Path;

use super::{
    InvocationStrategy, StrategySettings, fabric_transform_argv, query_argv, whisper_argv, yt_argv,
};
use crate::pipeline::plan::{InvocationPlan, TEXT_FLAG};
use crate::pipeline::platform::Platform;
use crate::pipeline::tools::Flavor;

/// Runs tools as plain child processes.
///
/// Text that would not fit in a single argument is staged and becomes the
/// tool's stdin instead.
#[derive(Debug, Clone)]
pub struct NativeStrategy {
    settings: StrategySettings,
}

impl NativeStrategy {
    pub fn new(settings: StrategySettings) -> Self {
        Self { settings }
    }
}

impl InvocationStrategy for NativeStrategy {
    fn platform(&self) -> Platform {
        Platform::Unix
    }

    fn transform(&self, flavor: Flavor, step: &str, model: &str, input: &str) -> InvocationPlan {
        let fabric = self.settings.tools.fabric_for(flavor);
        let mut argv = fabric_transform_argv(fabric, step, model);

        if input.len() > self.settings.inline_text_limit {
            return InvocationPlan::staged_stdin("fabric", argv, input);
        }

        argv.push(format!("{TEXT_FLAG}={input}"));
        InvocationPlan::direct("fabric", argv)
    }

    fn transcript(&self, url: &str) -> InvocationPlan {
        InvocationPlan::direct("yt", yt_argv(&self.settings.tools.yt, url))
    }

    fn speech_to_text(&self, media: &Path, output_dir: &Path) -> InvocationPlan {
        InvocationPlan::direct(
            "whisper",
            whisper_argv(
                &self.settings.tools,
                media.to_string_lossy().into_owned(),
                output_dir.to_string_lossy().into_owned(),
            ),
        )
    }

    fn fabric_query(&self, flavor: Flavor, args: &[&str]) -> InvocationPlan {
        InvocationPlan::direct(
            "fabric",
            query_argv(self.settings.tools.fabric_for(flavor), args),
        )
    }
}
