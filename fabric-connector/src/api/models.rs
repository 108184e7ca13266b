//! API request and response models (DTOs).
//!
//! Field names follow what existing clients (the Obsidian plugin and the
//! browser extension) already send, including the legacy single `pattern`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{CatalogEntry, CompositionMode, Flavor, PipelineRequest};

// ============================================================================
// Pipelines
// ============================================================================

/// Options shared by every pipeline endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineOptions {
    /// Ordered pattern names
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Legacy single pattern, appended after `patterns`
    #[serde(default)]
    pub pattern: Option<String>,
    /// Model id; empty uses the tool's default
    #[serde(default)]
    pub model: String,
    /// Chain steps instead of concatenating their outputs
    #[serde(default)]
    pub chain: bool,
    /// Use the alternate fabric build
    #[serde(default)]
    pub alternate: bool,
}

impl PipelineOptions {
    /// Validate into a pipeline request.
    pub fn into_request(self) -> Result<PipelineRequest> {
        let mut steps = self.patterns;
        if let Some(pattern) = self.pattern
            && !pattern.trim().is_empty()
        {
            steps.push(pattern);
        }
        PipelineRequest::new(
            steps,
            self.model,
            CompositionMode::from_chain(self.chain),
            Flavor::from_alternate(self.alternate),
        )
    }
}

/// Body of `POST /fabric`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextPipelineRequest {
    #[serde(flatten)]
    pub options: PipelineOptions,
    /// Input text
    pub data: String,
}

/// Body of `POST /yt`.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlPipelineRequest {
    #[serde(flatten)]
    pub options: PipelineOptions,
    /// Video URL
    pub url: String,
}

/// Body of `POST /file`.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePipelineRequest {
    #[serde(flatten)]
    pub options: PipelineOptions,
    /// Path of a local media file
    pub path: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputResponse {
    pub output: String,
}

// ============================================================================
// Catalogs
// ============================================================================

/// Query string of the catalog listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub alternate: bool,
}

impl CatalogQuery {
    pub fn flavor(&self) -> Flavor {
        Flavor::from_alternate(self.alternate)
    }
}

/// `{"data": {"patterns": [...]}}`
#[derive(Debug, Clone, Serialize)]
pub struct PatternListResponse {
    pub data: PatternList,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternList {
    pub patterns: Vec<CatalogEntry>,
}

impl PatternListResponse {
    pub fn new(patterns: Vec<CatalogEntry>) -> Self {
        Self {
            data: PatternList { patterns },
        }
    }
}

/// `{"data": {"models": [...]}}`
#[derive(Debug, Clone, Serialize)]
pub struct ModelListResponse {
    pub data: ModelList,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelList {
    pub models: Vec<CatalogEntry>,
}

impl ModelListResponse {
    pub fn new(models: Vec<CatalogEntry>) -> Self {
        Self {
            data: ModelList { models },
        }
    }
}

/// Body of `POST /models/default`.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultModelRequest {
    pub model: String,
    #[serde(default)]
    pub alternate: bool,
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub platform: String,
    pub uptime_secs: u64,
}
