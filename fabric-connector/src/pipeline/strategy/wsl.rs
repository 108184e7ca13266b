//! Invocation through WSL on Windows hosts.

use std::path::Path;

use super::{
    InvocationStrategy, StrategySettings, fabric_transform_argv, query_argv, whisper_argv, yt_argv,
};
use crate::pipeline::paths::to_wsl_mount;
use crate::pipeline::plan::InvocationPlan;
use crate::pipeline::platform::Platform;
use crate::pipeline::tools::Flavor;

const WSL: &str = "wsl";
const POWERSHELL: &str = r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";

/// Runs Linux builds of the tools inside WSL.
///
/// Pattern text always goes through a staging file piped by PowerShell, since
/// multi-line arguments do not survive the Windows command line intact.
#[derive(Debug, Clone)]
pub struct WslStrategy {
    settings: StrategySettings,
    wsl: String,
    powershell: String,
}

impl WslStrategy {
    pub fn new(settings: StrategySettings) -> Self {
        Self {
            settings,
            wsl: WSL.to_string(),
            powershell: POWERSHELL.to_string(),
        }
    }

    fn wrapper(&self) -> Vec<String> {
        vec![self.wsl.clone(), "-e".to_string()]
    }

    /// Fabric path for a flavor, with the alternate-build rewrite applied.
    fn fabric_path(&self, flavor: Flavor) -> String {
        let path = self.settings.tools.fabric_for(flavor);
        match (flavor, &self.settings.alternate_rewrite) {
            (Flavor::Alternate, Some(rewrite)) => rewrite.apply(path),
            _ => path.to_string(),
        }
    }
}

impl InvocationStrategy for WslStrategy {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn transform(&self, flavor: Flavor, step: &str, model: &str, input: &str) -> InvocationPlan {
        let mut consumer = self.wrapper();
        consumer.extend(fabric_transform_argv(&self.fabric_path(flavor), step, model));

        InvocationPlan::shell_piped(
            "fabric",
            vec![
                self.powershell.clone(),
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
            ],
            consumer,
            input,
        )
    }

    fn transcript(&self, url: &str) -> InvocationPlan {
        InvocationPlan::wrapped("yt", self.wrapper(), yt_argv(&self.settings.tools.yt, url))
    }

    fn speech_to_text(&self, media: &Path, output_dir: &Path) -> InvocationPlan {
        InvocationPlan::wrapped(
            "whisper",
            self.wrapper(),
            whisper_argv(
                &self.settings.tools,
                to_wsl_mount(&media.to_string_lossy()),
                to_wsl_mount(&output_dir.to_string_lossy()),
            ),
        )
    }

    fn fabric_query(&self, flavor: Flavor, args: &[&str]) -> InvocationPlan {
        InvocationPlan::wrapped("fabric", self.wrapper(), query_argv(&self.fabric_path(flavor), args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::paths::PrefixRewrite;
    use crate::pipeline::plan::Invocation;
    use crate::pipeline::tools::ToolPaths;

    fn strategy() -> WslStrategy {
        WslStrategy::new(
            StrategySettings::new(ToolPaths::under_home("/home/chase"))
                .with_alternate_rewrite(Some(PrefixRewrite::new("/home/chase", "/root"))),
        )
    }

    #[test]
    fn test_transform_is_always_staged() {
        let plan = strategy().transform(Flavor::Local, "summarize", "gpt-4o", "short");
        match plan.invocation {
            Invocation::ShellPiped {
                shell,
                consumer,
                input,
            } => {
                assert_eq!(shell[0], POWERSHELL);
                assert_eq!(shell.last().map(String::as_str), Some("-Command"));
                assert_eq!(
                    consumer,
                    vec![
                        "wsl",
                        "-e",
                        "/home/chase/.local/bin/fabric",
                        "-sp",
                        "summarize",
                        "--model",
                        "gpt-4o"
                    ]
                );
                assert_eq!(input, "short");
            }
            other => panic!("expected shell-piped plan, got {other:?}"),
        }
    }

    #[test]
    fn test_alternate_rewrite_applies_to_every_fabric_call() {
        let strategy = strategy();
        let transform = strategy.transform(Flavor::Alternate, "summarize", "", "x");
        assert_eq!(transform.tool_argv()[2], "/root/go/bin/fabric");

        let listing = strategy.fabric_query(Flavor::Alternate, &["--listmodels"]);
        assert_eq!(listing.tool_argv()[0], "/root/go/bin/fabric");

        let local = strategy.fabric_query(Flavor::Local, &["--list"]);
        assert_eq!(local.tool_argv()[0], "/home/chase/.local/bin/fabric");
    }

    #[test]
    fn test_transcript_is_wrapped() {
        let plan = strategy().transcript("https://youtu.be/abc");
        assert_eq!(
            plan.invocation,
            Invocation::Wrapped {
                wrapper: vec!["wsl".to_string(), "-e".to_string()],
                argv: vec![
                    "/home/chase/.local/bin/yt".to_string(),
                    "--transcript".to_string(),
                    "https://youtu.be/abc".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_speech_to_text_maps_paths() {
        let plan = strategy().speech_to_text(
            Path::new(r"C:\Users\chase\clip.mp3"),
            Path::new(r"C:\Temp\whisper-1"),
        );
        let argv = plan.tool_argv();
        assert_eq!(argv[1], "/mnt/c/Users/chase/clip.mp3");
        assert_eq!(argv[5], "/mnt/c/Temp/whisper-1");
    }
}
