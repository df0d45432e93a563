//! # Events
//!
//! Typed events published by the charity ledger.
//!
//! Only the payout-address workflow and the two money-out paths emit events;
//! cause creation, donations and ownership transfers are silent. Each event
//! is published under a `(short symbol, cause_id)` topic pair so indexers can
//! filter by kind and by cause, with the structs below as data.
//!
//! | Topic symbol | Data                |
//! |--------------|---------------------|
//! | `proposed`   | [`ChangeProposed`]  |
//! | `applied`    | [`ChangeApplied`]   |
//! | `refunded`   | [`RefundIssued`]    |
//! | `settled`    | [`FundsSettled`]    |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// A payout-address change was proposed for a cause.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeProposed {
    pub cause_id: u64,
    pub new_address: Address,
}

/// A previously proposed payout-address change was applied.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeApplied {
    pub cause_id: u64,
    pub new_address: Address,
}

/// A contributor reclaimed part or all of their donation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundIssued {
    pub cause_id: u64,
    pub donor: Address,
    pub amount: i128,
}

/// A fulfilled cause's escrow was paid out to its target address.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsSettled {
    pub cause_id: u64,
    pub target_address: Address,
    pub amount: i128,
}

pub fn emit_change_proposed(env: &Env, cause_id: u64, new_address: Address) {
    env.events().publish(
        (symbol_short!("proposed"), cause_id),
        ChangeProposed {
            cause_id,
            new_address,
        },
    );
}

pub fn emit_change_applied(env: &Env, cause_id: u64, new_address: Address) {
    env.events().publish(
        (symbol_short!("applied"), cause_id),
        ChangeApplied {
            cause_id,
            new_address,
        },
    );
}

pub fn emit_refund_issued(env: &Env, cause_id: u64, donor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), cause_id),
        RefundIssued {
            cause_id,
            donor,
            amount,
        },
    );
}

pub fn emit_funds_settled(env: &Env, cause_id: u64, target_address: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("settled"), cause_id),
        FundsSettled {
            cause_id,
            target_address,
            amount,
        },
    );
}
