extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, BytesN, Env, IntoVal, String, TryIntoVal,
};

use crate::events::{ChangeApplied, ChangeProposed, FundsSettled, RefundIssued};
use crate::{CharityLedger, CharityLedgerClient, ADDRESS_CHANGE_COOLDOWN};

fn setup() -> (Env, CharityLedgerClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| {
        li.timestamp = 1_700_000_000;
    });
    let contract_id = env.register(CharityLedger, ());
    let client = CharityLedgerClient::new(&env, &contract_id);
    (env, client)
}

fn setup_with_init() -> (
    Env,
    CharityLedgerClient<'static>,
    token::StellarAssetClient<'static>,
) {
    let (env, client) = setup();
    let admin = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    client.init(&admin, &sac.address());
    let token_sac = token::StellarAssetClient::new(&env, &sac.address());
    (env, client, token_sac)
}

fn create_cause(
    env: &Env,
    client: &CharityLedgerClient,
    creator: &Address,
    target: i128,
    target_address: &Address,
) -> u64 {
    client.create_cause(
        creator,
        &String::from_str(env, "Food Bank"),
        &String::from_str(env, "Winter supplies for the shelter"),
        &BytesN::from_array(env, &[0xcdu8; 32]),
        &target,
        &(env.ledger().timestamp() + 30 * 86_400),
        target_address,
    )
}

#[test]
fn test_change_proposed_event() {
    let (env, client, _token_sac) = setup_with_init();
    let creator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let replacement = Address::generate(&env);
    let id = create_cause(&env, &client, &creator, 1_000, &beneficiary);

    client.suggest_target_address_change(&id, &creator, &replacement);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("proposed"), cause_id)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("proposed").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    // Data: ChangeProposed struct
    let event_data: ChangeProposed = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ChangeProposed {
            cause_id: id,
            new_address: replacement.clone(),
        }
    );
}

#[test]
fn test_change_applied_event() {
    let (env, client, _token_sac) = setup_with_init();
    let creator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let replacement = Address::generate(&env);
    let id = create_cause(&env, &client, &creator, 1_000, &beneficiary);

    client.suggest_target_address_change(&id, &creator, &replacement);
    env.ledger().with_mut(|li| {
        li.timestamp += ADDRESS_CHANGE_COOLDOWN;
    });
    client.change_target_address(&id, &creator);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("applied"), cause_id)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("applied").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    // Data: ChangeApplied struct
    let event_data: ChangeApplied = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ChangeApplied {
            cause_id: id,
            new_address: replacement.clone(),
        }
    );
}

#[test]
fn test_refund_issued_event() {
    let (env, client, token_sac) = setup_with_init();
    let creator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let donor = Address::generate(&env);
    let amount = 250i128;
    let id = create_cause(&env, &client, &creator, 10_000, &beneficiary);

    token_sac.mint(&donor, &1_000i128);
    client.donate(&id, &donor, &1_000i128);
    client.suggest_target_address_change(&id, &creator, &Address::generate(&env));

    client.withdraw_funds_from_charity(&id, &donor, &amount);

    // The refunded event is published after the token transfer, so it is
    // the last event of the invocation.
    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("refunded").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: RefundIssued = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        RefundIssued {
            cause_id: id,
            donor: donor.clone(),
            amount,
        }
    );
}

#[test]
fn test_funds_settled_event() {
    let (env, client, token_sac) = setup_with_init();
    let creator = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let donor = Address::generate(&env);
    let id = create_cause(&env, &client, &creator, 400, &beneficiary);

    token_sac.mint(&donor, &400i128);
    client.donate(&id, &donor, &400i128);

    client.withdraw_collected_funds(&id);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("settled").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundsSettled = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsSettled {
            cause_id: id,
            target_address: beneficiary.clone(),
            amount: 400,
        }
    );
}
