pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize logging, start the HTTP server and serve until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let app_config = config::AppConfig::from_env();
    tracing::info!(
        "{} starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );
    if !app_config.has_provider_key() {
        tracing::warn!("GEMINI_API_KEY not set: OCR will fail and analysis will be degraded");
    }

    let bind_addr = app_config.bind_addr;
    let ctx = api::ApiContext::new(app_config);
    let mut server = api::start_api_server(ctx, bind_addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
