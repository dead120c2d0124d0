use std::{net::SocketAddr, sync::Arc};

use tracing::{info, warn};
use tubelink::{
    common::{AnyResult, logger},
    configs::Config,
    server::AppState,
    transport,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let (config, from_file) = match Config::load()? {
        Some(config) => (config, true),
        None => (Config::default(), false),
    };

    logger::init(&config);
    if !from_file {
        warn!("No config.toml or config.default.toml found, using built-in defaults");
    }

    let address: SocketAddr =
        format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = Arc::new(AppState::from_config(config)?);
    let app = transport::router(state);

    info!("tubelink v{} listening on {}", env!("CARGO_PKG_VERSION"), address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
