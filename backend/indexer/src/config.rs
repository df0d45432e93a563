//! Runtime configuration, read once from the environment at startup.

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint, e.g. https://soroban-testnet.stellar.org
    pub rpc_url: String,
    /// Strkey address of the charity ledger contract whose events are indexed.
    pub contract_id: String,
    /// SQLite database location.
    pub database_url: String,
    /// Port the REST API listens on.
    pub api_port: u16,
    /// Seconds to wait between RPC polls.
    pub poll_interval_secs: u64,
    /// Page size for `getEvents` requests.
    pub events_per_page: u32,
    /// First ledger to scan when no cursor has been saved yet.
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // The contract address is the one setting without a sane default.
        let contract_id = std::env::var("CONTRACT_ID")
            .map_err(|_| IndexerError::Config("CONTRACT_ID is not set".to_string()))?;

        Ok(Config {
            rpc_url: env_or("RPC_URL", "https://soroban-testnet.stellar.org"),
            contract_id,
            database_url: env_or("DATABASE_URL", "sqlite:./charity_events.db"),
            api_port: env_parsed("API_PORT", 3001)?,
            poll_interval_secs: env_parsed("POLL_INTERVAL_SECS", 5)?,
            events_per_page: env_parsed("EVENTS_PER_PAGE", 100)?,
            start_ledger: env_parsed("START_LEDGER", 0)?,
        })
    }
}

/// String variable with a default for the unset case.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parsed variable with a default for the unset case. A variable that is set
/// but malformed is a configuration error, not a silent fallback.
fn env_parsed<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| IndexerError::Config(format!("{key} cannot be parsed from {raw:?}"))),
        Err(_) => Ok(default),
    }
}
