//! Embedded HTTP service lifecycle.
//!
//! `ServiceHandle` owns the running API server task. The tray front-ends and
//! the binary drive it through `start()` / `stop()`; both are idempotent.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::Result;
use crate::api::server::{ApiServer, ApiServerConfig, AppState};
use crate::service::Connector;

/// Lifecycle state of the embedded service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Stopped,
    Running,
    StoppingGraceful,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::StoppingGraceful => "stopping_graceful",
        };
        f.write_str(s)
    }
}

struct RunningServer {
    cancel_token: CancellationToken,
    task: JoinHandle<Result<()>>,
}

/// Start/stop handle for the API server.
pub struct ServiceHandle {
    config: ApiServerConfig,
    connector: Arc<Connector>,
    shutdown_grace: Duration,
    state: RwLock<ServiceState>,
    local_addr: RwLock<Option<SocketAddr>>,
    running: Mutex<Option<RunningServer>>,
}

impl ServiceHandle {
    pub fn new(config: ApiServerConfig, connector: Arc<Connector>, shutdown_grace: Duration) -> Self {
        Self {
            config,
            connector,
            shutdown_grace,
            state: RwLock::new(ServiceState::Stopped),
            local_addr: RwLock::new(None),
            running: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    /// Address the server is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read()
    }

    /// Bind the listener and spawn the server task.
    ///
    /// Returns the current state unchanged if the service is already running.
    pub async fn start(&self) -> Result<ServiceState> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(self.state());
        }

        let server = ApiServer::new(self.config.clone(), AppState::new(self.connector.clone()));
        let listener = server.bind().await?;
        let addr = listener.local_addr()?;
        let cancel_token = server.cancel_token();

        let task = tokio::spawn(async move {
            let result = server.serve(listener).await;
            if let Err(e) = &result {
                error!("API server exited with error: {}", e);
            }
            result
        });

        *self.local_addr.write() = Some(addr);
        *self.state.write() = ServiceState::Running;
        *running = Some(RunningServer { cancel_token, task });

        info!(%addr, "Service started");
        Ok(ServiceState::Running)
    }

    /// Stop accepting requests, wait for in-flight ones up to the grace
    /// period, then abort the server task.
    ///
    /// Returns the current state unchanged if the service is not running.
    pub async fn stop(&self) -> ServiceState {
        let mut running = self.running.lock().await;
        let Some(RunningServer {
            cancel_token,
            mut task,
        }) = running.take()
        else {
            return self.state();
        };

        *self.state.write() = ServiceState::StoppingGraceful;
        info!(grace = ?self.shutdown_grace, "Stopping service");
        cancel_token.cancel();

        match tokio::time::timeout(self.shutdown_grace, &mut task).await {
            Ok(Ok(_)) => info!("Service stopped"),
            Ok(Err(e)) => error!("API server task failed: {}", e),
            Err(_) => {
                warn!("Shutdown grace period elapsed, aborting server task");
                task.abort();
            }
        }

        *self.local_addr.write() = None;
        *self.state.write() = ServiceState::Stopped;
        ServiceState::Stopped
    }
}
