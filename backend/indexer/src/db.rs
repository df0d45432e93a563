//! SQLite persistence: migrations, the indexer cursor, and event storage.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{CharityEvent, EventRecord};

/// Open the connection pool and bring the schema up to date.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // sqlx wants the scheme prefix; tolerate plain file paths in the env.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready at {url}");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Indexer cursor
// ─────────────────────────────────────────────────────────

/// Where the indexer left off: the last fully processed ledger plus the
/// opaque pagination cursor, if a page boundary fell mid-ledger. A fresh
/// database reports `(0, None)`.
pub async fn load_cursor(pool: &SqlitePool) -> Result<(i64, Option<String>)> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT last_ledger, last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.unwrap_or((0, None)))
}

/// Record indexer progress. The cursor table holds a single row, seeded by
/// the initial migration, so this is always an update.
pub async fn save_cursor(pool: &SqlitePool, ledger: i64, cursor: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(ledger)
        .bind(cursor)
        .execute(pool)
        .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Store a batch of decoded events, skipping any the database has already
/// seen. Duplicates are detected by the unique index over
/// `(ledger, tx_hash, event_type, cause_id)`, which makes re-polling an
/// already-processed ledger range harmless. Returns how many rows were
/// actually new.
pub async fn insert_events(pool: &SqlitePool, events: &[CharityEvent]) -> Result<usize> {
    let mut stored = 0usize;
    for ev in events {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO events \
                 (event_type, cause_id, actor, amount, ledger, timestamp, contract_id, tx_hash) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&ev.event_type)
        .bind(&ev.cause_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            stored += 1;
        }
    }
    Ok(stored)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Total number of events stored so far.
pub async fn count_events(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Every stored event for one cause, oldest first.
pub async fn get_events_for_cause(pool: &SqlitePool, cause_id: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        "SELECT id, event_type, cause_id, actor, amount, \
                ledger, timestamp, contract_id, tx_hash, created_at \
           FROM events \
          WHERE cause_id = ?1 \
          ORDER BY ledger, id",
    )
    .bind(cause_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every stored event across all causes, oldest first.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        "SELECT id, event_type, cause_id, actor, amount, \
                ledger, timestamp, contract_id, tx_hash, created_at \
           FROM events \
          ORDER BY ledger, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Each connection gets its own `:memory:` database, so the pool must
    /// stay capped at a single connection.
    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    fn sample_event(cause_id: &str, ledger: i64) -> CharityEvent {
        CharityEvent {
            event_type: "refund_issued".to_string(),
            cause_id: Some(cause_id.to_string()),
            actor: Some("GDONOR".to_string()),
            amount: Some("250".to_string()),
            ledger,
            timestamp: 1_700_000_000,
            contract_id: "CCONTRACT".to_string(),
            tx_hash: Some(format!("tx-{ledger}")),
        }
    }

    #[tokio::test]
    async fn cursor_starts_at_zero_and_roundtrips() {
        let pool = memory_pool().await;
        assert_eq!(load_cursor(&pool).await.unwrap(), (0, None));

        save_cursor(&pool, 12_345, Some("cursor-abc")).await.unwrap();
        let (ledger, cursor) = load_cursor(&pool).await.unwrap();
        assert_eq!(ledger, 12_345);
        assert_eq!(cursor.as_deref(), Some("cursor-abc"));

        // Clearing the pagination cursor keeps the ledger position.
        save_cursor(&pool, 12_346, None).await.unwrap();
        assert_eq!(load_cursor(&pool).await.unwrap(), (12_346, None));
    }

    #[tokio::test]
    async fn insert_events_is_idempotent() {
        let pool = memory_pool().await;
        let events = vec![sample_event("1", 100), sample_event("2", 101)];

        assert_eq!(insert_events(&pool, &events).await.unwrap(), 2);
        // Replaying the same batch inserts nothing new.
        assert_eq!(insert_events(&pool, &events).await.unwrap(), 0);
        assert_eq!(count_events(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn events_filtered_by_cause() {
        let pool = memory_pool().await;
        let events = vec![
            sample_event("1", 100),
            sample_event("2", 101),
            sample_event("1", 102),
        ];
        insert_events(&pool, &events).await.unwrap();

        let cause_events = get_events_for_cause(&pool, "1").await.unwrap();
        assert_eq!(cause_events.len(), 2);
        assert!(cause_events
            .iter()
            .all(|e| e.cause_id.as_deref() == Some("1")));
        assert_eq!(cause_events[0].ledger, 100);
        assert_eq!(cause_events[1].ledger, 102);

        assert_eq!(get_all_events(&pool).await.unwrap().len(), 3);
    }
}
