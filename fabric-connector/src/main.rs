use std::sync::Arc;

use fabric_connector::config::ConnectorConfig;
use fabric_connector::logging;
use fabric_connector::pipeline::Platform;
use fabric_connector::service::{Connector, ServiceHandle};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logging first, so configuration warnings are recorded
    let log_dir = ConnectorConfig::log_dir_from_vars(|key| std::env::var(key).ok());
    let (logging_config, _guard) = logging::init_logging(&log_dir)?;
    let cancel_token = CancellationToken::new();
    logging_config.start_retention_cleanup(cancel_token.clone());

    // Refuse to run anywhere the tools cannot be reached
    let platform = Platform::detect()?;
    let config = ConnectorConfig::from_env_or_default(platform)?;

    tracing::info!(
        platform = %config.platform,
        log_dir = %logging_config.log_dir().display(),
        "fabric-connector starting"
    );

    let connector = Arc::new(Connector::from_config(&config));
    let handle = ServiceHandle::new(config.server.clone(), connector, config.shutdown_grace);
    handle.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C, shutting down");

    handle.stop().await;
    cancel_token.cancel();

    tracing::info!("fabric-connector stopped");
    Ok(())
}
