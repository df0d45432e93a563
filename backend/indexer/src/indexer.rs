//! The polling loop: tail the contract's event stream and keep SQLite
//! caught up with it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

/// Everything one poll iteration needs, bundled for the spawned task.
pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Run the poll loop until `shutdown` is cancelled. The iteration in flight
/// is allowed to finish, so the saved cursor always reflects completed work.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexing events from {}", state.config.contract_id);

    // A saved position wins over START_LEDGER: rewinding is harmless thanks
    // to idempotent inserts, but skipping forward would leave gaps.
    let mut position = match db::load_cursor(&state.pool).await {
        Ok((ledger, cursor)) if ledger > 0 => (ledger as u32, cursor),
        _ => (state.config.start_ledger, None),
    };
    info!("Resuming from ledger {}", position.0);

    let mut failures = 0u32;
    loop {
        match poll_once(&state, position.0, position.1.as_deref()).await {
            Ok(next) => {
                if failures > 0 {
                    info!("Poll recovered after {failures} failed attempts");
                    failures = 0;
                }
                position = next;
            }
            Err(e) => {
                failures += 1;
                error!("Poll failed ({failures} in a row): {e}");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Indexer stopped");
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }
}

/// One fetch-decode-store round trip. Returns the position to poll from
/// next, already persisted to the cursor table.
async fn poll_once(
    state: &IndexerState,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let config = &state.config;
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let stored = db::insert_events(&state.pool, &decoded).await?;
        info!("Stored {stored} of {} fetched events", raw_events.len());
    }

    // While the RPC keeps handing back a pagination cursor the current
    // range is not exhausted; the start ledger stays put so a lost cursor
    // rewinds instead of skipping. Once pagination drains, jump to the
    // newest ledger the RPC has seen.
    let next_ledger = if next_cursor.is_some() {
        start_ledger
    } else {
        latest_ledger
            .map(|l| (l as u32).max(start_ledger))
            .unwrap_or(start_ledger)
    };

    db::save_cursor(&state.pool, next_ledger as i64, next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}
