use std::sync::Arc;

use anyhow::Context;

use shareit_infra::config::{AppConfig, LogFormat};
use shareit_observability::LogOutput;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    let output = match config.log_format {
        LogFormat::Json => LogOutput::Json,
        LogFormat::Pretty => LogOutput::Pretty,
    };
    shareit_observability::init(output, &config.log_level);

    let services = shareit_api::app::services::build_services(&config)
        .await
        .context("failed to initialise stores")?;
    let app = shareit_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
