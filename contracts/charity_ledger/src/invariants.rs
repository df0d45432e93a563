extern crate std;

use crate::types::{AddressChangeProposal, Cause};

/// Escrowed balance must never be negative.
pub fn assert_collected_non_negative(cause: &Cause) {
    assert!(
        cause.collected_funds >= 0,
        "cause {} has negative collected funds ({})",
        cause.id,
        cause.collected_funds
    );
}

/// Funding target must always be positive.
pub fn assert_target_positive(cause: &Cause) {
    assert!(
        cause.target_amount > 0,
        "cause {} has non-positive target ({})",
        cause.id,
        cause.target_amount
    );
}

/// Collected funds must equal the sum of recorded per-donor contributions.
pub fn assert_funds_conserved(cause: &Cause, contributions: &[i128]) {
    let sum: i128 = contributions.iter().sum();
    assert_eq!(
        cause.collected_funds, sum,
        "cause {}: collected {} does not match contribution sum {}",
        cause.id, cause.collected_funds, sum
    );
}

/// Cause IDs are sequential starting from 1.
pub fn assert_sequential_ids(causes: &[Cause]) {
    for (i, cause) in causes.iter().enumerate() {
        assert_eq!(
            cause.id,
            i as u64 + 1,
            "expected id {}, got {}",
            i + 1,
            cause.id
        );
    }
}

/// A cause that has used its one address change may not hold a proposal.
pub fn assert_locked_has_no_proposal(cause: &Cause, proposal: &Option<AddressChangeProposal>) {
    if cause.address_changed_once {
        assert!(
            proposal.is_none(),
            "cause {} is locked but still has a pending proposal",
            cause.id
        );
    }
}

/// The contract's token balance must cover everything still held in escrow.
pub fn assert_escrow_covers(total_collected: i128, contract_balance: i128) {
    assert!(
        contract_balance >= total_collected,
        "escrow balance {} below total collected {}",
        contract_balance,
        total_collected
    );
}

/// Fields fixed at creation (creator, title, description, content hash,
/// target amount, deadline) must survive every later operation unchanged.
pub fn assert_immutable_fields(original: &Cause, current: &Cause) {
    assert_eq!(original.id, current.id, "cause id changed");
    assert_eq!(original.creator, current.creator, "cause creator changed");
    assert_eq!(original.title, current.title, "cause title changed");
    assert_eq!(
        original.description, current.description,
        "cause description changed"
    );
    assert_eq!(
        original.content_hash, current.content_hash,
        "cause content hash changed"
    );
    assert_eq!(
        original.target_amount, current.target_amount,
        "cause target amount changed"
    );
    assert_eq!(original.deadline, current.deadline, "cause deadline changed");
}

/// Run all stateless cause invariants.
pub fn assert_cause_invariants(cause: &Cause) {
    assert_collected_non_negative(cause);
    assert_target_positive(cause);
}
