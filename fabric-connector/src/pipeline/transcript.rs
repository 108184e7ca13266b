//! Transcript sources feeding the pattern pipeline.
//!
//! A video URL is turned into text by `yt`; a media file by `whisper`. Both
//! outputs are reduced to their timestamped lines. Whisper also writes
//! subtitle artifacts to disk, so every transcription gets its own output
//! directory which is emptied and removed afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::launcher::Launcher;
use super::postprocess::extract_timestamped_lines;
use super::strategy::InvocationStrategy;
use crate::{Error, Result};

#[derive(Clone)]
pub struct TranscriptSources {
    strategy: Arc<dyn InvocationStrategy>,
    launcher: Arc<dyn Launcher>,
    whisper_output_root: PathBuf,
}

impl TranscriptSources {
    pub fn new(
        strategy: Arc<dyn InvocationStrategy>,
        launcher: Arc<dyn Launcher>,
        whisper_output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            strategy,
            launcher,
            whisper_output_root: whisper_output_root.into(),
        }
    }

    /// Fetch a video transcript and keep only its timestamped lines.
    pub async fn fetch_url(&self, url: &str) -> Result<String> {
        info!(url, "Fetching transcript");
        let plan = self.strategy.transcript(url);
        let raw = self.launcher.run(&plan).await?;

        let transcript = extract_timestamped_lines(&raw);
        if transcript.is_empty() {
            warn!(url, "Transcript has no timestamped lines");
        }
        Ok(transcript)
    }

    /// Transcribe a media file and keep only its timestamped lines.
    pub async fn transcribe_file(&self, media: &Path) -> Result<String> {
        let output_dir = self.create_output_dir().await?;
        info!(
            media = %media.display(),
            output_dir = %output_dir.path().display(),
            "Transcribing media file"
        );

        let plan = self.strategy.speech_to_text(media, output_dir.path());
        let result = self.launcher.run(&plan).await;
        clear_output_dir(output_dir).await;

        let transcript = extract_timestamped_lines(&result?);
        if transcript.is_empty() {
            warn!(media = %media.display(), "Speech-to-text produced no timestamped lines");
        }
        Ok(transcript)
    }

    async fn create_output_dir(&self) -> Result<TempDir> {
        let root = &self.whisper_output_root;
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| Error::staging("creating", root, e))?;

        tempfile::Builder::new()
            .prefix("whisper-")
            .tempdir_in(root)
            .map_err(|e| Error::staging("creating output directory in", root, e))
    }
}

/// Delete every entry of a per-invocation output directory, then the
/// directory itself. Failures are logged.
async fn clear_output_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    let mut removed = 0usize;

    match tokio::fs::read_dir(&path).await {
        Ok(mut entries) => loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %path.display(), error = %e, "Failed to read output directory");
                    break;
                }
            };

            let entry_path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let outcome = if is_dir {
                tokio::fs::remove_dir_all(&entry_path).await
            } else {
                tokio::fs::remove_file(&entry_path).await
            };

            match outcome {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %entry_path.display(), error = %e, "Failed to delete transcription artifact")
                }
            }
        },
        Err(e) => warn!(dir = %path.display(), error = %e, "Failed to list output directory"),
    }

    if let Err(e) = dir.close() {
        warn!(dir = %path.display(), error = %e, "Failed to remove output directory");
    }
    debug!(dir = %path.display(), removed, "Cleared transcription output");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{ScriptedLauncher, unix_strategy};

    #[tokio::test]
    async fn test_fetch_url_keeps_timestamped_lines() {
        let launcher = ScriptedLauncher::new(vec![Ok(
            "Fetching video...\n[0:00.000 --> 0:03.200] hello there\n[0:03.200 --> 0:05.000] bye".to_string(),
        )]);
        let root = tempfile::tempdir().unwrap();
        let sources = TranscriptSources::new(unix_strategy(), launcher.clone(), root.path());

        let text = sources.fetch_url("https://youtu.be/abc").await.unwrap();
        assert_eq!(text, "[0:00.000 --> 0:03.200] hello there\n[0:03.200 --> 0:05.000] bye");
        assert_eq!(
            launcher.calls()[0].tool_argv(),
            &["/home/me/.local/bin/yt", "--transcript", "https://youtu.be/abc"]
        );
    }

    #[tokio::test]
    async fn test_fetch_url_without_timestamps_is_empty() {
        let launcher = ScriptedLauncher::new(vec![Ok("plain transcript text".to_string())]);
        let root = tempfile::tempdir().unwrap();
        let sources = TranscriptSources::new(unix_strategy(), launcher, root.path());

        assert_eq!(sources.fetch_url("https://youtu.be/abc").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_transcribe_file_filters_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Ok(
            "Detected language: English\n[00:00.000 --> 00:02.000]  Hi.".to_string(),
        )])
        .with_side_effect(|plan| {
            // Whisper writes artifacts into the directory passed after --output_dir.
            let argv = plan.tool_argv();
            let dir = Path::new(&argv[argv.len() - 1]);
            std::fs::write(dir.join("clip.srt"), "1\n00:00 --> 00:02\nHi.").unwrap();
            std::fs::create_dir(dir.join("nested")).unwrap();
            std::fs::write(dir.join("nested").join("clip.json"), "{}").unwrap();
        });
        let sources = TranscriptSources::new(unix_strategy(), launcher.clone(), root.path());

        let text = sources.transcribe_file(Path::new("/tmp/clip.mp3")).await.unwrap();
        assert_eq!(text, "[00:00.000 --> 00:02.000]  Hi.");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_transcribe_file_cleans_up_on_failure() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Err(Error::external_tool("whisper", 1, "bad file"))]);
        let sources = TranscriptSources::new(unix_strategy(), launcher.clone(), root.path());

        let err = sources.transcribe_file(Path::new("/tmp/clip.mp3")).await.unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_output_dirs_are_private() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Ok(String::new()), Ok(String::new())]);
        let sources = TranscriptSources::new(unix_strategy(), launcher.clone(), root.path());

        sources.transcribe_file(Path::new("/tmp/a.mp3")).await.unwrap();
        sources.transcribe_file(Path::new("/tmp/b.mp3")).await.unwrap();

        let calls = launcher.calls();
        let dir_a = calls[0].tool_argv().last().cloned();
        let dir_b = calls[1].tool_argv().last().cloned();
        assert_ne!(dir_a, dir_b);
    }
}
