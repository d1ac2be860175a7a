use std::sync::Arc;

use tasi::WebScraper;
use tasi_web::{AppState, router};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8056";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();

    let ct = tokio_util::sync::CancellationToken::new();

    let state = Arc::new(AppState::new(WebScraper::new()?));
    let app = router(state);

    let address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.into());
    let tcp_listener = tokio::net::TcpListener::bind(&address).await?;

    log::info!("Starting tasi web scraper on http://{}", address);

    let shutdown = ct.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {e:?}");
        }
        shutdown.cancel();
    });

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(ct.cancelled_owned())
        .await?;

    log::info!("Server stopped");

    Ok(())
}
