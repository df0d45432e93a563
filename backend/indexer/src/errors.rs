//! Error plumbing for the indexer binary.
//!
//! Everything fallible funnels into [`IndexerError`] so `?` works across
//! the sqlx, reqwest and serde boundaries without ceremony at call sites.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The RPC answered, but with something we cannot work with.
    #[error("rpc: {0}")]
    Rpc(String),
}
