//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the ledger:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key          | Type      | Description                        |
//! |--------------|-----------|------------------------------------|
//! | `Admin`      | `Address` | Current contract administrator     |
//! | `Token`      | `Address` | Escrow asset shared by all causes  |
//! | `CauseCount` | `u64`     | Highest cause ID assigned so far   |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                       | Type                    | Description                      |
//! |---------------------------|-------------------------|----------------------------------|
//! | `CauseConfig(id)`         | `CauseConfig`           | Immutable cause configuration    |
//! | `CauseState(id)`          | `CauseState`            | Mutable cause state              |
//! | `Contribution(id, donor)` | `i128`                  | Cumulative donation per donor    |
//! | `Proposal(id)`            | `AddressChangeProposal` | Pending payout-address change    |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Why split Config and State?
//!
//! Donations are high-frequency writes. Writing the full `Cause` struct with
//! its title and description on every donation is wasteful. `CauseState` holds
//! only the payout address, the changed-once flag and the escrow balance, so
//! the hot path rewrites a small entry while the public API stays clean via
//! the reconstructed [`Cause`] return type.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::types::{AddressChangeProposal, Cause, CauseConfig, CauseState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
///
/// Instance-tier keys (`Admin`, `Token`, `CauseCount`) live as long as the
/// contract and are extended together. Persistent-tier keys hold per-cause
/// data with independent TTLs.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Current contract administrator (Instance).
    Admin,
    /// Escrow token every cause is denominated in (Instance).
    Token,
    /// Highest cause ID assigned; IDs are gapless starting at 1 (Instance).
    CauseCount,
    /// Immutable cause configuration keyed by ID (Persistent).
    CauseConfig(u64),
    /// Mutable cause state keyed by ID (Persistent).
    CauseState(u64),
    /// Cumulative donation keyed by (cause ID, donor) (Persistent).
    Contribution(u64, Address),
    /// Pending payout-address change keyed by cause ID (Persistent).
    Proposal(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Whether `init` has already run.
pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

/// Store the administrator address in instance storage.
pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

/// Retrieve the administrator address.
/// Panics if the contract has not been initialized.
pub fn get_admin(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("admin not set")
}

/// Store the escrow token address in instance storage.
pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

/// Retrieve the escrow token address.
/// Panics if the contract has not been initialized.
pub fn get_token(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .expect("token not set")
}

/// Number of causes created so far.
pub fn get_cause_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CauseCount)
        .unwrap_or(0)
}

/// Atomically reads, increments, and stores the cause counter.
/// Returns the ID to use for the *current* cause (post-increment value,
/// so the first cause gets ID 1).
pub fn next_cause_id(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::CauseCount)
        .unwrap_or(0);
    let id = current + 1;
    env.storage().instance().set(&DataKey::CauseCount, &id);
    id
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save both the immutable config and initial mutable state for a new cause.
pub fn save_cause(env: &Env, cause: &Cause) {
    let config_key = DataKey::CauseConfig(cause.id);
    let state_key = DataKey::CauseState(cause.id);

    let config = CauseConfig {
        id: cause.id,
        creator: cause.creator.clone(),
        title: cause.title.clone(),
        description: cause.description.clone(),
        content_hash: cause.content_hash.clone(),
        target_amount: cause.target_amount,
        deadline: cause.deadline,
    };

    let state = CauseState {
        target_address: cause.target_address.clone(),
        address_changed_once: cause.address_changed_once,
        collected_funds: cause.collected_funds,
    };

    env.storage().persistent().set(&config_key, &config);
    env.storage().persistent().set(&state_key, &state);
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);
}

/// Load the full `Cause` by combining config and state.
/// Panics with `Error::CauseNotFound` if the cause does not exist.
pub fn load_cause(env: &Env, id: u64) -> Cause {
    let config = load_cause_config(env, id);
    let state = load_cause_state(env, id);
    Cause {
        id: config.id,
        creator: config.creator,
        title: config.title,
        description: config.description,
        content_hash: config.content_hash,
        target_amount: config.target_amount,
        deadline: config.deadline,
        target_address: state.target_address,
        address_changed_once: state.address_changed_once,
        collected_funds: state.collected_funds,
    }
}

/// Load only the immutable cause configuration.
pub fn load_cause_config(env: &Env, id: u64) -> CauseConfig {
    let key = DataKey::CauseConfig(id);
    let config: CauseConfig = match env.storage().persistent().get(&key) {
        Some(config) => config,
        None => panic_with_error!(env, Error::CauseNotFound),
    };
    bump_persistent(env, &key);
    config
}

/// Load only the mutable cause state.
pub fn load_cause_state(env: &Env, id: u64) -> CauseState {
    let key = DataKey::CauseState(id);
    let state: CauseState = match env.storage().persistent().get(&key) {
        Some(state) => state,
        None => panic_with_error!(env, Error::CauseNotFound),
    };
    bump_persistent(env, &key);
    state
}

/// Save only the mutable cause state (the hot path for donations).
pub fn save_cause_state(env: &Env, id: u64, state: &CauseState) {
    let key = DataKey::CauseState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

/// Cumulative amount `donor` has given to cause `id`; zero if they never
/// donated. Only bumps the TTL when the entry actually exists.
pub fn get_contribution(env: &Env, id: u64, donor: &Address) -> i128 {
    let key = DataKey::Contribution(id, donor.clone());
    match env.storage().persistent().get(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

/// Record the cumulative contribution of `donor` to cause `id`.
pub fn set_contribution(env: &Env, id: u64, donor: &Address, amount: i128) {
    let key = DataKey::Contribution(id, donor.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}

/// The pending payout-address proposal for cause `id`, if any.
pub fn get_proposal(env: &Env, id: u64) -> Option<AddressChangeProposal> {
    let key = DataKey::Proposal(id);
    let proposal: Option<AddressChangeProposal> = env.storage().persistent().get(&key);
    if proposal.is_some() {
        bump_persistent(env, &key);
    }
    proposal
}

/// Record a pending payout-address proposal for cause `id`.
pub fn save_proposal(env: &Env, id: u64, proposal: &AddressChangeProposal) {
    let key = DataKey::Proposal(id);
    env.storage().persistent().set(&key, proposal);
    bump_persistent(env, &key);
}

/// Clear the pending proposal, returning the cause to the no-proposal state.
pub fn remove_proposal(env: &Env, id: u64) {
    env.storage().persistent().remove(&DataKey::Proposal(id));
}
