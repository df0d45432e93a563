//! Event vocabulary shared by the decoder, the database layer, and the API.
//!
//! The kinds here correspond one-to-one with the contract's emit helpers in
//! `contracts/charity_ledger/src/events.rs`; the topic symbols must stay in
//! sync with what the contract publishes.

use serde::{Deserialize, Serialize};

/// Everything the charity ledger contract can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A payout-address change was proposed (`proposed` topic).
    ChangeProposed,
    /// A payout-address change was applied (`applied` topic).
    ChangeApplied,
    /// A contributor reclaimed part of their donation (`refunded` topic).
    RefundIssued,
    /// A fulfilled cause's escrow was paid out (`settled` topic).
    FundsSettled,
    /// Anything whose leading topic we do not recognise. Kept rather than
    /// dropped so a contract upgrade does not silently lose history.
    Unknown,
}

impl EventKind {
    /// Classify an event by its leading topic symbol.
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "proposed" => Self::ChangeProposed,
            "applied" => Self::ChangeApplied,
            "refunded" => Self::RefundIssued,
            "settled" => Self::FundsSettled,
            _ => Self::Unknown,
        }
    }

    /// Stable name used in the `event_type` column and in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChangeProposed => "change_proposed",
            Self::ChangeApplied => "change_applied",
            Self::RefundIssued => "refund_issued",
            Self::FundsSettled => "funds_settled",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded contract event, shaped for insertion. `id` and `created_at`
/// only exist once the row is stored, hence the separate [`EventRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharityEvent {
    pub event_type: String,
    pub cause_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as it comes back out of SQLite.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub cause_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
