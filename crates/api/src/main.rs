use anyhow::Context;

use keygate_api::app;
use keygate_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keygate_observability::init();

    let config = AppConfig::from_env()?;
    let app = app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, "keygate listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
