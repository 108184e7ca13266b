//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use fabric_connector::pipeline::{
    InvocationPlan, InvocationStrategy, Launcher, Platform, StrategySettings, ToolPaths, strategy,
};
use fabric_connector::{Error, Result};
use parking_lot::Mutex;

/// Answers every invocation from a script and records the plans it saw.
pub struct RecordingLauncher {
    responses: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<InvocationPlan>>,
}

impl RecordingLauncher {
    pub fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Succeeds `n` times with `out-1`, `out-2`, ...
    pub fn numbered(n: usize) -> Arc<Self> {
        Self::new((1..=n).map(|i| Ok(format!("out-{i}\n"))).collect())
    }

    pub fn calls(&self) -> Vec<InvocationPlan> {
        self.calls.lock().clone()
    }

    /// Text each call received, inline or staged.
    pub fn inputs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|plan| plan.text_payload().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn run(&self, plan: &InvocationPlan) -> Result<String> {
        self.calls.lock().push(plan.clone());
        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(out)) => Ok(out.trim_end().to_string()),
            Some(Err(e)) => Err(e),
            None => Err(Error::Other("unexpected invocation".to_string())),
        }
    }
}

pub fn unix_strategy() -> Arc<dyn InvocationStrategy> {
    strategy::for_platform(
        Platform::Unix,
        StrategySettings::new(ToolPaths::under_home("/home/tester")),
    )
}

pub fn windows_strategy() -> Arc<dyn InvocationStrategy> {
    strategy::for_platform(
        Platform::Windows,
        StrategySettings::new(ToolPaths::under_home("/home/tester")),
    )
}
