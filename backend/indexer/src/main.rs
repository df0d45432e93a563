//! Event indexer for the charity ledger contract.
//!
//! One process, two halves: a poller that tails the contract's on-chain
//! event stream into SQLite, and a REST API serving what has been indexed
//! so far. The two share nothing but the connection pool.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod indexer;
mod rpc;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use indexer::IndexerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A .env file is a convenience, not a requirement.
    let _ = dotenvy::dotenv();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = db::init_pool(&config.database_url).await?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // Cancelled on ctrl-c; stops the poll loop alongside the API server.
    let shutdown = CancellationToken::new();

    let poller = Arc::new(IndexerState {
        pool: pool.clone(),
        config: config.clone(),
        client: http,
    });
    tokio::spawn(indexer::run(poller, shutdown.clone()));

    let app = api::router(Arc::new(api::ApiState { pool }));
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_ctrl_c(shutdown))
        .await?;

    Ok(())
}

async fn wait_for_ctrl_c(token: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
    token.cancel();
}
