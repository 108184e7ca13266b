//! Command-chaining pipeline.
//!
//! Requests flow one way through this module:
//! request -> [`InvocationStrategy`] builds an [`InvocationPlan`] per step ->
//! [`Launcher`] runs it -> [`PipelineExecutor`] combines step outputs.
//! Transcript sources and catalogs use the same strategy/launcher pair.

pub mod catalog;
pub mod executor;
pub mod launcher;
pub mod paths;
pub mod plan;
pub mod platform;
pub mod postprocess;
pub mod staging;
pub mod strategy;
pub mod tools;
pub mod transcript;

pub use catalog::{Catalog, CatalogEntry};
pub use executor::{CompositionMode, PipelineExecutor, PipelineRequest};
pub use launcher::{Launcher, ProcessLauncher};
pub use plan::{Invocation, InvocationPlan};
pub use platform::Platform;
pub use staging::StagingArea;
pub use strategy::{InvocationStrategy, StrategySettings};
pub use tools::{Flavor, ToolPaths};
pub use transcript::TranscriptSources;
