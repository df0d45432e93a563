//! # Charity Ledger Contract
//!
//! This is the root crate of the **charity ledger**, a single-contract escrow
//! for donation-based fundraising. It exposes the Soroban contract
//! `CharityLedger` whose entry points cover the full cause lifecycle:
//!
//! | Phase          | Entry Point(s)                                   |
//! |----------------|--------------------------------------------------|
//! | Bootstrap      | [`CharityLedger::init`]                          |
//! | Creation       | [`CharityLedger::create_cause`]                  |
//! | Funding        | [`CharityLedger::donate`]                        |
//! | Payout address | `suggest_target_address_change`, `change_target_address` |
//! | Money out      | `withdraw_funds_from_charity`, `withdraw_collected_funds` |
//! | Administration | [`CharityLedger::transfer_ownership`]            |
//! | Queries        | `get_all_causes`, `get_cause`, `get_collected_funds`, `get_contribution`, `get_proposal` |
//!
//! ## Architecture
//!
//! All causes share a single escrow token fixed at initialization; donated
//! funds are held by the contract itself until a cause reaches its target and
//! anyone triggers settlement. Storage access is fully delegated to
//! [`storage`], event emission to [`events`]. This file contains only the
//! public entry points and their precondition checks.
//!
//! ## Payout-address changes
//!
//! A creator gets exactly one payout-address change per cause, and it is
//! time-locked: the new address must first sit as a proposal for
//! [`ADDRESS_CHANGE_COOLDOWN`] seconds before it can be applied. While a
//! proposal is pending, contributors may withdraw their donations back out of
//! escrow.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, BytesN, Env, String,
    Vec,
};

mod storage;
mod types;
pub mod events;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

use storage::{
    has_admin, load_cause, load_cause_config, load_cause_state, next_cause_id, remove_proposal,
    save_cause, save_cause_state, save_proposal, set_admin, set_contribution, set_token,
};
pub use types::{AddressChangeProposal, Cause};

/// Strkey of the all-zero ed25519 account, the conventional null address.
/// Proposed payout destinations are rejected if they equal it.
pub const NULL_ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

/// Minimum time between proposing a payout-address change and applying it,
/// in seconds (24 hours). The boundary is inclusive: a change may be applied
/// exactly when the cooldown has elapsed.
pub const ADDRESS_CHANGE_COOLDOWN: u64 = 86_400;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized     = 1,
    CauseNotFound          = 2,
    Unauthorized           = 3,
    TargetAlreadyFulfilled = 4,
    TargetNotFulfilled     = 5,
    AlreadyChangedOnce     = 6,
    ProposalAlreadyExists  = 7,
    NoProposal             = 8,
    NoOpAddress            = 9,
    NullAddress            = 10,
    CooldownNotElapsed     = 11,
    InvalidAmount          = 12,
    InsufficientBalance    = 13,
}

#[contract]
pub struct CharityLedger;

#[contractimpl]
impl CharityLedger {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract with its administrator and escrow token.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls panic with `Error::AlreadyInitialized`.
    ///
    /// - `admin` may later hand the role on via `transfer_ownership`.
    /// - `token` is the asset every cause is denominated in; it cannot be
    ///   changed afterwards.
    pub fn init(env: Env, admin: Address, token: Address) {
        admin.require_auth();
        if has_admin(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        set_admin(&env, &admin);
        set_token(&env, &token);
    }

    // ─────────────────────────────────────────────────────────
    // Cause creation and queries
    // ─────────────────────────────────────────────────────────

    /// Create a new fundraising cause. Returns the assigned cause ID.
    ///
    /// IDs are sequential starting at 1. `target_amount` must be positive;
    /// everything else, including `target_address` and `deadline`, is stored
    /// as given. The deadline is informational and never enforced.
    pub fn create_cause(
        env: Env,
        caller: Address,
        title: String,
        description: String,
        content_hash: BytesN<32>,
        target_amount: i128,
        deadline: u64,
        target_address: Address,
    ) -> u64 {
        caller.require_auth();

        if target_amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let id = next_cause_id(&env);

        let cause = Cause {
            id,
            creator: caller,
            title,
            description,
            content_hash,
            target_amount,
            deadline,
            target_address,
            address_changed_once: false,
            collected_funds: 0,
        };

        save_cause(&env, &cause);
        id
    }

    /// Retrieve every cause, in creation order.
    pub fn get_all_causes(env: Env) -> Vec<Cause> {
        let count = storage::get_cause_count(&env);
        let mut causes = Vec::new(&env);
        for id in 1..=count {
            causes.push_back(load_cause(&env, id));
        }
        causes
    }

    /// Retrieve a cause by its ID.
    pub fn get_cause(env: Env, cause_id: u64) -> Cause {
        load_cause(&env, cause_id)
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Donate `amount` of the escrow token to a cause.
    ///
    /// Rejected once the cause has reached its target. The donated amount is
    /// transferred into the contract's own balance and recorded against the
    /// donor, so it can be reclaimed while an address change is pending.
    pub fn donate(env: Env, cause_id: u64, donor: Address, amount: i128) {
        donor.require_auth();

        let config = load_cause_config(&env, cause_id);
        let mut state = load_cause_state(&env, cause_id);

        if state.collected_funds >= config.target_amount {
            panic_with_error!(&env, Error::TargetAlreadyFulfilled);
        }
        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        // Transfer tokens from donor into escrow.
        let token_client = token::Client::new(&env, &storage::get_token(&env));
        token_client.transfer(&donor, &env.current_contract_address(), &amount);

        state.collected_funds += amount;
        save_cause_state(&env, cause_id, &state);

        let contributed = storage::get_contribution(&env, cause_id, &donor);
        set_contribution(&env, cause_id, &donor, contributed + amount);
    }

    // ─────────────────────────────────────────────────────────
    // Payout-address changes
    // ─────────────────────────────────────────────────────────

    /// Propose a new payout address for a cause.
    ///
    /// Only the cause's creator may propose, at most one proposal may be
    /// pending, and the one allowed change must not have been used yet.
    /// The proposed address must differ from the current payout address and
    /// must not be the null address.
    ///
    /// Emits a `proposed` event; the change itself can be applied via
    /// [`CharityLedger::change_target_address`] once the cooldown elapses.
    pub fn suggest_target_address_change(
        env: Env,
        cause_id: u64,
        caller: Address,
        new_address: Address,
    ) {
        caller.require_auth();

        let config = load_cause_config(&env, cause_id);
        let state = load_cause_state(&env, cause_id);

        if caller != config.creator {
            panic_with_error!(&env, Error::Unauthorized);
        }
        if state.address_changed_once {
            panic_with_error!(&env, Error::AlreadyChangedOnce);
        }
        if storage::get_proposal(&env, cause_id).is_some() {
            panic_with_error!(&env, Error::ProposalAlreadyExists);
        }
        if new_address == state.target_address {
            panic_with_error!(&env, Error::NoOpAddress);
        }
        if new_address == Address::from_str(&env, NULL_ADDRESS) {
            panic_with_error!(&env, Error::NullAddress);
        }

        let proposal = AddressChangeProposal {
            proposed_address: new_address.clone(),
            proposed_at: env.ledger().timestamp(),
        };
        save_proposal(&env, cause_id, &proposal);

        events::emit_change_proposed(&env, cause_id, new_address);
    }

    /// Apply a pending payout-address change.
    ///
    /// Only the cause's creator may apply, and only once the cooldown has
    /// elapsed since the proposal was recorded (the boundary ledger is
    /// allowed). Applying consumes the proposal and permanently locks the
    /// cause against further changes.
    ///
    /// Emits an `applied` event.
    pub fn change_target_address(env: Env, cause_id: u64, caller: Address) {
        caller.require_auth();

        let config = load_cause_config(&env, cause_id);
        let mut state = load_cause_state(&env, cause_id);

        if caller != config.creator {
            panic_with_error!(&env, Error::Unauthorized);
        }
        let proposal = match storage::get_proposal(&env, cause_id) {
            Some(proposal) => proposal,
            None => panic_with_error!(&env, Error::NoProposal),
        };
        if env.ledger().timestamp() < proposal.proposed_at + ADDRESS_CHANGE_COOLDOWN {
            panic_with_error!(&env, Error::CooldownNotElapsed);
        }

        state.target_address = proposal.proposed_address.clone();
        state.address_changed_once = true;
        save_cause_state(&env, cause_id, &state);
        remove_proposal(&env, cause_id);

        events::emit_change_applied(&env, cause_id, proposal.proposed_address);
    }

    // ─────────────────────────────────────────────────────────
    // Money out
    // ─────────────────────────────────────────────────────────

    /// Withdraw part or all of the caller's own donation back out of escrow.
    ///
    /// Only available while a payout-address change is pending, as an exit
    /// for contributors who disagree with the proposed destination. `amount`
    /// may exceed neither the caller's recorded contribution nor the cause's
    /// remaining escrow (a settled cause keeps its contribution entries while
    /// its pool is empty); a zero withdrawal is permitted.
    ///
    /// Emits a `refunded` event.
    pub fn withdraw_funds_from_charity(env: Env, cause_id: u64, donor: Address, amount: i128) {
        donor.require_auth();

        let mut state = load_cause_state(&env, cause_id);

        let contributed = storage::get_contribution(&env, cause_id, &donor);
        if contributed == 0 {
            panic_with_error!(&env, Error::Unauthorized);
        }
        if storage::get_proposal(&env, cause_id).is_none() {
            panic_with_error!(&env, Error::NoProposal);
        }
        if amount < 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        if amount > contributed {
            panic_with_error!(&env, Error::InsufficientBalance);
        }
        // Contribution entries survive settlement; the escrow pool is the
        // binding limit.
        if amount > state.collected_funds {
            panic_with_error!(&env, Error::InsufficientBalance);
        }

        set_contribution(&env, cause_id, &donor, contributed - amount);
        state.collected_funds -= amount;
        save_cause_state(&env, cause_id, &state);

        let token_client = token::Client::new(&env, &storage::get_token(&env));
        token_client.transfer(&env.current_contract_address(), &donor, &amount);

        events::emit_refund_issued(&env, cause_id, donor, amount);
    }

    /// Settle a fulfilled cause: pay its entire escrow to the current payout
    /// address.
    ///
    /// Anyone may trigger settlement once `collected_funds` has reached the
    /// target; the full balance (including any overshoot) is forwarded and
    /// the cause's escrow is zeroed. A second settlement fails with
    /// `Error::TargetNotFulfilled` since the balance is back below target.
    ///
    /// Emits a `settled` event.
    pub fn withdraw_collected_funds(env: Env, cause_id: u64) {
        let config = load_cause_config(&env, cause_id);
        let mut state = load_cause_state(&env, cause_id);

        if state.collected_funds < config.target_amount {
            panic_with_error!(&env, Error::TargetNotFulfilled);
        }

        let amount = state.collected_funds;
        state.collected_funds = 0;
        save_cause_state(&env, cause_id, &state);

        let token_client = token::Client::new(&env, &storage::get_token(&env));
        token_client.transfer(&env.current_contract_address(), &state.target_address, &amount);

        events::emit_funds_settled(&env, cause_id, state.target_address, amount);
    }

    // ─────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────

    /// Hand the administrator role to `new_admin`.
    ///
    /// `caller` must be the current administrator. The new address is stored
    /// as given; handing the role to an unusable address permanently orphans
    /// it.
    pub fn transfer_ownership(env: Env, caller: Address, new_admin: Address) {
        caller.require_auth();
        if caller != storage::get_admin(&env) {
            panic_with_error!(&env, Error::Unauthorized);
        }
        set_admin(&env, &new_admin);
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Escrowed balance of a cause.
    pub fn get_collected_funds(env: Env, cause_id: u64) -> i128 {
        load_cause_state(&env, cause_id).collected_funds
    }

    /// Cumulative amount `donor` has given to a cause; zero if none.
    pub fn get_contribution(env: Env, cause_id: u64, donor: Address) -> i128 {
        storage::get_contribution(&env, cause_id, &donor)
    }

    /// The pending payout-address proposal for a cause, if any.
    pub fn get_proposal(env: Env, cause_id: u64) -> Option<AddressChangeProposal> {
        storage::get_proposal(&env, cause_id)
    }

    /// Current administrator.
    pub fn get_admin(env: Env) -> Address {
        storage::get_admin(&env)
    }

    /// Escrow token shared by all causes.
    pub fn get_token(env: Env) -> Address {
        storage::get_token(&env)
    }

    /// Number of causes created so far.
    pub fn get_cause_count(env: Env) -> u64 {
        storage::get_cause_count(&env)
    }
}
