//! Connector facade.
//!
//! The Connector wires the platform strategy and the process launcher into
//! the pipeline executor, the transcript sources and the catalogs, and is
//! the single entry point the HTTP layer talks to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::config::ConnectorConfig;
use crate::pipeline::{
    Catalog, CatalogEntry, Flavor, InvocationStrategy, Launcher, PipelineExecutor,
    PipelineRequest, Platform, ProcessLauncher, StagingArea, StrategySettings, TranscriptSources,
    strategy,
};
use crate::{Error, Result};

/// Pipeline, transcript and catalog operations behind one handle.
#[derive(Clone)]
pub struct Connector {
    executor: PipelineExecutor,
    transcripts: TranscriptSources,
    catalog: Catalog,
}

impl Connector {
    /// Create a connector from explicit parts.
    pub fn new(
        strategy: Arc<dyn InvocationStrategy>,
        launcher: Arc<dyn Launcher>,
        whisper_output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor: PipelineExecutor::new(strategy.clone(), launcher.clone()),
            transcripts: TranscriptSources::new(
                strategy.clone(),
                launcher.clone(),
                whisper_output_root,
            ),
            catalog: Catalog::new(strategy, launcher),
        }
    }

    /// Create a connector that launches real processes.
    pub fn from_config(config: &ConnectorConfig) -> Self {
        info!(
            platform = %config.platform,
            fabric = %config.tools.fabric,
            fabric_alternate = %config.tools.fabric_alternate,
            timeout = ?config.tool_timeout,
            "Initializing connector"
        );

        let settings = StrategySettings::new(config.tools.clone())
            .with_alternate_rewrite(config.alternate_rewrite.clone());
        let strategy = strategy::for_platform(config.platform, settings);

        let launcher = ProcessLauncher::new(StagingArea::new(&config.staging_dir))
            .with_timeout(config.tool_timeout);

        Self::new(strategy, Arc::new(launcher), &config.whisper_output_root)
    }

    pub fn platform(&self) -> Platform {
        self.executor.strategy().platform()
    }

    /// Run the pipeline over caller-supplied text.
    pub async fn run_text(&self, request: &PipelineRequest, text: &str) -> Result<String> {
        self.executor.execute(request, text).await
    }

    /// Fetch the video transcript for `url` and run the pipeline over it.
    pub async fn run_url(&self, request: &PipelineRequest, url: &str) -> Result<String> {
        let url = validate_url(url)?;
        let transcript = self.transcripts.fetch_url(url.as_str()).await?;
        self.executor.execute(request, &transcript).await
    }

    /// Transcribe a local media file and run the pipeline over the transcript.
    pub async fn run_file(&self, request: &PipelineRequest, path: &str) -> Result<String> {
        let media = validate_media_path(path).await?;
        let transcript = self.transcripts.transcribe_file(&media).await?;
        self.executor.execute(request, &transcript).await
    }

    pub async fn list_templates(&self, flavor: Flavor) -> Result<Vec<CatalogEntry>> {
        self.catalog.list_templates(flavor).await
    }

    pub async fn list_models(&self, flavor: Flavor) -> Result<Vec<CatalogEntry>> {
        self.catalog.list_models(flavor).await
    }

    pub async fn set_default_model(&self, flavor: Flavor, model: &str) -> Result<String> {
        self.catalog.set_default_model(flavor, model).await
    }
}

/// Only absolute http(s) URLs are passed to the transcript tool.
fn validate_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| Error::validation(format!("Invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::validation(format!(
            "Unsupported URL scheme '{other}', expected http or https"
        ))),
    }
}

async fn validate_media_path(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("File path cannot be empty"));
    }

    let path = Path::new(raw);
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(path.to_path_buf()),
        Ok(_) => Err(Error::validation(format!("Not a file: {raw}"))),
        Err(_) => Err(Error::validation(format!("File not found: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{ScriptedLauncher, unix_strategy};
    use crate::pipeline::{CompositionMode, Invocation};

    fn request(steps: &[&str], mode: CompositionMode) -> PipelineRequest {
        PipelineRequest::new(
            steps.iter().map(|s| s.to_string()).collect(),
            "",
            mode,
            Flavor::Local,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_url(" http://youtu.be/abc ").is_ok());
        assert!(matches!(validate_url("file:///etc/passwd"), Err(Error::Validation(_))));
        assert!(matches!(validate_url("not a url"), Err(Error::Validation(_))));
        assert!(matches!(validate_url("-x"), Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_run_url_feeds_transcript_into_pipeline() {
        let launcher = ScriptedLauncher::new(vec![
            Ok("Downloading\n[0:00.000 --> 0:02.000] the transcript".to_string()),
            Ok("a summary".to_string()),
        ]);
        let root = tempfile::tempdir().unwrap();
        let connector = Connector::new(unix_strategy(), launcher.clone(), root.path());

        let out = connector
            .run_url(&request(&["summarize"], CompositionMode::Chain), "https://youtu.be/abc")
            .await
            .unwrap();
        assert_eq!(out, "a summary");

        let calls = launcher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool, "yt");
        assert_eq!(
            calls[1].text_payload(),
            Some("[0:00.000 --> 0:02.000] the transcript")
        );
    }

    #[tokio::test]
    async fn test_run_url_rejects_bad_scheme_without_running_tools() {
        let launcher = ScriptedLauncher::new(vec![]);
        let root = tempfile::tempdir().unwrap();
        let connector = Connector::new(unix_strategy(), launcher.clone(), root.path());

        let err = connector
            .run_url(&request(&["summarize"], CompositionMode::Chain), "ftp://host/file")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(launcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_file_requires_existing_file() {
        let launcher = ScriptedLauncher::new(vec![]);
        let root = tempfile::tempdir().unwrap();
        let connector = Connector::new(unix_strategy(), launcher.clone(), root.path());
        let req = request(&["summarize"], CompositionMode::Chain);

        let missing = root.path().join("missing.mp3");
        let err = connector
            .run_file(&req, &missing.to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = connector
            .run_file(&req, &root.path().to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(launcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_file_filters_whisper_output() {
        let media_dir = tempfile::tempdir().unwrap();
        let media = media_dir.path().join("clip.mp3");
        std::fs::write(&media, b"not really audio").unwrap();

        let launcher = ScriptedLauncher::new(vec![
            Ok("Detecting language\n[00:00.000 --> 00:01.500]  Hello.\n".to_string()),
            Ok("summary".to_string()),
        ]);
        let root = tempfile::tempdir().unwrap();
        let connector = Connector::new(unix_strategy(), launcher.clone(), root.path());

        let out = connector
            .run_file(
                &request(&["summarize"], CompositionMode::Concatenate),
                &media.to_string_lossy(),
            )
            .await
            .unwrap();
        assert_eq!(out, "summary");

        let calls = launcher.calls();
        assert_eq!(calls[0].tool, "whisper");
        assert!(matches!(calls[0].invocation, Invocation::Direct { .. }));
        assert_eq!(
            calls[1].text_payload(),
            Some("[00:00.000 --> 00:01.500]  Hello.")
        );
    }
}
