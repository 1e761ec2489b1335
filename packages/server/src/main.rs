use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use receipt_server::config::AppConfig;
use receipt_server::database;
use receipt_server::state::AppState;
use receipt_server::store::ReceiptStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Origin Receipt v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;

    // One pool for the whole process; handlers only ever clone the handle.
    let db = database::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    database::migrate(&db)
        .await
        .context("failed to initialize the receipt schema")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host / server.port")?;

    let state = AppState {
        store: ReceiptStore::new(db),
        config,
    };
    let app = receipt_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
