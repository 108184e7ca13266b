//! Pipeline executor.
//!
//! Runs an ordered list of fabric patterns over one input and combines their
//! outputs according to a [`CompositionMode`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::launcher::Launcher;
use super::strategy::InvocationStrategy;
use super::tools::Flavor;
use crate::{Error, Result};

/// Separator between step outputs in concatenate mode.
const CONCAT_SEPARATOR: &str = "\n\n";

/// How step outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    /// Each step consumes the previous step's output; the last output wins.
    Chain,
    /// Every step consumes the original input; all outputs are joined.
    Concatenate,
}

impl CompositionMode {
    pub fn from_chain(chain: bool) -> Self {
        if chain { Self::Chain } else { Self::Concatenate }
    }
}

/// A validated pattern pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    steps: Vec<String>,
    model: String,
    mode: CompositionMode,
    flavor: Flavor,
}

impl PipelineRequest {
    /// Validate and build a request.
    ///
    /// Steps must be non-empty; neither steps nor the model may look like a
    /// command-line flag. An empty model selects the tool's default.
    pub fn new(
        steps: Vec<String>,
        model: impl Into<String>,
        mode: CompositionMode,
        flavor: Flavor,
    ) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::validation("At least one pattern is required"));
        }

        let steps = steps
            .into_iter()
            .map(|s| {
                let s = s.trim().to_string();
                validate_identifier("pattern", &s)?;
                Ok(s)
            })
            .collect::<Result<Vec<_>>>()?;

        let model = model.into().trim().to_string();
        if !model.is_empty() {
            validate_identifier("model", &model)?;
        }

        Ok(Self {
            steps,
            model,
            mode,
            flavor,
        })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// Reject empty values, flag-like values and control characters.
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!("{kind} name cannot be empty")));
    }
    if value.starts_with('-') {
        return Err(Error::validation(format!(
            "{kind} name cannot start with '-': {value}"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::validation(format!(
            "{kind} name cannot contain control characters"
        )));
    }
    Ok(())
}

/// Runs pattern pipelines through a strategy and a launcher.
#[derive(Clone)]
pub struct PipelineExecutor {
    strategy: Arc<dyn InvocationStrategy>,
    launcher: Arc<dyn Launcher>,
}

impl PipelineExecutor {
    pub fn new(strategy: Arc<dyn InvocationStrategy>, launcher: Arc<dyn Launcher>) -> Self {
        Self { strategy, launcher }
    }

    pub fn strategy(&self) -> &Arc<dyn InvocationStrategy> {
        &self.strategy
    }

    /// Run every step in order and return the combined output.
    ///
    /// Steps never overlap: step N+1 starts after step N's process exited. The
    /// first failing step aborts the pipeline.
    pub async fn execute(&self, request: &PipelineRequest, initial_input: &str) -> Result<String> {
        let total = request.steps.len();
        let mut current_input = initial_input.to_string();
        let mut aggregate = String::new();

        info!(
            steps = total,
            mode = ?request.mode,
            flavor = %request.flavor,
            input_bytes = initial_input.len(),
            "Running pattern pipeline"
        );

        for (index, step) in request.steps.iter().enumerate() {
            debug!(step = %step, position = index + 1, total, "Running pattern");

            let plan = self
                .strategy
                .transform(request.flavor, step, &request.model, &current_input);
            let result = self.launcher.run(&plan).await?;

            match request.mode {
                CompositionMode::Chain => {
                    aggregate.clone_from(&result);
                    current_input = result;
                }
                CompositionMode::Concatenate => {
                    aggregate.push_str(&result);
                    aggregate.push_str(CONCAT_SEPARATOR);
                }
            }
        }

        Ok(aggregate.trim_end().to_string())
    }
}
