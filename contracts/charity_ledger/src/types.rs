//! # Types
//!
//! Shared data structures used across all modules of the charity ledger.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Cause` is internally stored as two separate ledger entries:
//!
//! - [`CauseConfig`]: written once at creation; never mutated.
//! - [`CauseState`]: written on every donation, refund, settlement and
//!   payout-address change.
//!
//! The public API exposes the reconstructed [`Cause`] struct for convenience.
//!
//! ### Proposal as its own entry
//!
//! A pending payout-address change lives in a separate
//! [`AddressChangeProposal`] entry rather than inside the state struct, so
//! "no proposal pending" is simply the absence of the entry and applying a
//! change removes it in one step.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Immutable cause configuration, written once at creation.
///
/// Stored separately from mutable state to reduce write costs on donations
/// (state stays ~60 bytes while the config carries the free-text fields).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CauseConfig {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub content_hash: BytesN<32>,
    pub target_amount: i128,
    pub deadline: u64,
}

/// Mutable cause state, updated on donations, refunds, settlement and
/// payout-address changes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CauseState {
    pub target_address: Address,
    pub address_changed_once: bool,
    pub collected_funds: i128,
}

/// Full on-chain representation of a fundraising cause.
///
/// Used as the public API return type; reconstructed internally from
/// the split `CauseConfig` + `CauseState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cause {
    /// Unique identifier (auto-incremented, starting at 1).
    pub id: u64,
    /// Address that created the cause and controls its payout address.
    pub creator: Address,
    /// Display title of the campaign.
    pub title: String,
    /// Longer-form description of the campaign.
    pub description: String,
    /// Content-hash of off-ledger campaign media (e.g. IPFS CID digest).
    pub content_hash: BytesN<32>,
    /// Funding goal, in the escrow token's smallest unit.
    pub target_amount: i128,
    /// Ledger timestamp recorded at creation; stored but not enforced.
    pub deadline: u64,
    /// Destination that receives the funds at settlement.
    pub target_address: Address,
    /// Whether the one allowed payout-address change has been used.
    pub address_changed_once: bool,
    /// Amount currently held in escrow for this cause.
    pub collected_funds: i128,
}

/// A pending payout-address change. At most one exists per cause.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressChangeProposal {
    /// Destination the creator wants to switch the payout to.
    pub proposed_address: Address,
    /// Ledger timestamp when the proposal was recorded; the change may be
    /// applied once the cooldown has elapsed from this point.
    pub proposed_at: u64,
}
