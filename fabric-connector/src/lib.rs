//! fabric-connector library crate.
//!
//! A local HTTP bridge that chains `fabric` pattern runs over text, video
//! transcripts (`yt`) and media transcriptions (`whisper`).

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod service;

pub use error::{Error, Result};
