extern crate std;

use common::roles::Role;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use vault::{VaultContract, VaultContractClient};

use crate::{ContractError, StakingContract, StakingContractClient};

const DAY: u64 = 86_400;
const WEEK: u64 = 7 * DAY;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Provisions a full test environment:
/// - Two SAC token contracts (stake + reward)
/// - A deployed VaultContract with the staking engine registered
/// - A deployed StakingContract with the reward token whitelisted
fn setup(
    min_lock: u64,
) -> (
    Env,
    StakingContractClient<'static>,
    VaultContractClient<'static>,
    Address, // admin
    Address, // stake_token
    Address, // reward_token
) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(0);

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let admin = Address::generate(&env);

    let vault_id = env.register(VaultContract, ());
    let vault = VaultContractClient::new(&env, &vault_id);
    vault.initialize(&admin);

    let contract_id = env.register(StakingContract, ());
    let client = StakingContractClient::new(&env, &contract_id);
    client.initialize(&admin, &stake_token, &vault_id, &min_lock);

    vault.register_engine(&admin, &contract_id);
    client.add_reward_token(&admin, &reward_token);

    (env, client, vault, admin, stake_token, reward_token)
}

fn mint(env: &Env, token: &Address, recipient: &Address, amount: i128) {
    StellarAssetClient::new(env, token).mint(recipient, &amount);
}

fn balance(env: &Env, token: &Address, holder: &Address) -> i128 {
    TokenClient::new(env, token).balance(holder)
}

/// Mints reward supply to the admin and pushes it through `supply_rewards`
/// into vault custody.
fn fund_rewards(
    env: &Env,
    client: &StakingContractClient,
    admin: &Address,
    reward_token: &Address,
    amount: i128,
    start_time: u64,
    duration: u64,
) {
    mint(env, reward_token, admin, amount);
    client.supply_rewards(admin, reward_token, &amount, &start_time, &duration);
}

// ── Initialisation ───────────────────────────────────────────────────────────

#[test]
fn test_initialize() {
    let (_env, client, _vault, admin, stake_token, _reward_token) = setup(DAY);

    assert_eq!(client.get_total_staked(), 0);
    assert_eq!(client.get_min_lock(), DAY);
    assert_eq!(client.get_role(&admin), Some(Role::Admin));
    assert_eq!(client.get_reward_tokens().len(), 1);

    let vault_addr = Address::generate(&_env);
    let result = client.try_initialize(&admin, &stake_token, &vault_addr, &DAY);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::AlreadyInitialized),
        _ => unreachable!("Expected AlreadyInitialized error"),
    }
}

// ── Staking ──────────────────────────────────────────────────────────────────

#[test]
fn test_stake_opens_position_and_pulls_tokens() {
    let (env, client, _vault, _admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    let index = client.stake(&staker, &600, &DAY);
    assert_eq!(index, 0);
    assert_eq!(client.get_staked(&staker), 600);
    assert_eq!(client.get_total_staked(), 600);
    assert_eq!(balance(&env, &stake_token, &staker), 400);
    assert_eq!(balance(&env, &stake_token, &client.address), 600);

    let positions = client.get_positions(&staker);
    assert_eq!(positions.len(), 1);
    let p = positions.get(0).unwrap();
    assert_eq!(p.amount, 600);
    assert_eq!(p.unlock_time, DAY);
    assert!(!p.withdrawn);
}

#[test]
fn test_stake_clamps_lock_to_minimum() {
    let (env, client, _vault, _admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    // A shorter lock is raised to the minimum; a longer one is kept.
    client.stake(&staker, &100, &60);
    client.stake(&staker, &100, &(3 * DAY));

    let positions = client.get_positions(&staker);
    assert_eq!(positions.get(0).unwrap().unlock_time, DAY);
    assert_eq!(positions.get(1).unwrap().unlock_time, 3 * DAY);
}

#[test]
fn test_stake_rejects_non_positive_amount() {
    let (env, client, _vault, _admin, _stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    let result = client.try_stake(&staker, &0, &DAY);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidAmount),
        _ => unreachable!("Expected InvalidAmount error"),
    }
}

// ── Withdrawal ───────────────────────────────────────────────────────────────

#[test]
fn test_withdraw_consumes_oldest_first() {
    let (env, client, _vault, _admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    client.stake(&staker, &300, &DAY);
    env.ledger().set_timestamp(100);
    client.stake(&staker, &200, &DAY);

    env.ledger().set_timestamp(2 * DAY);
    client.withdraw(&staker, &350);

    let positions = client.get_positions(&staker);
    assert!(positions.get(0).unwrap().withdrawn);
    let second = positions.get(1).unwrap();
    assert!(!second.withdrawn);
    assert_eq!(second.amount, 150); // split in place
    assert_eq!(client.get_staked(&staker), 150);
    assert_eq!(client.get_total_staked(), 150);
    assert_eq!(balance(&env, &stake_token, &staker), 850);
}

#[test]
fn test_withdraw_respects_locks() {
    let (env, client, _vault, _admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);
    client.stake(&staker, &500, &DAY);

    // Still locked: nothing is unlocked yet.
    env.ledger().set_timestamp(DAY - 1);
    let result = client.try_withdraw(&staker, &100);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientUnlocked),
        _ => unreachable!("Expected InsufficientUnlocked error"),
    }
    assert_eq!(client.get_locked(&staker), 500);
    assert_eq!(client.get_unlocked(&staker), 0);

    env.ledger().set_timestamp(DAY);
    assert_eq!(client.get_unlocked(&staker), 500);
    client.withdraw(&staker, &500);
    assert_eq!(client.get_staked(&staker), 0);
}

#[test]
fn test_withdraw_position_exact() {
    let (env, client, _vault, _admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);
    client.stake(&staker, &300, &DAY);
    client.stake(&staker, &200, &(5 * DAY));

    env.ledger().set_timestamp(2 * DAY);

    // The second position is still locked.
    let result = client.try_withdraw_position(&staker, &1);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::StillLocked),
        _ => unreachable!("Expected StillLocked error"),
    }

    assert_eq!(client.withdraw_position(&staker, &0), 300);
    assert_eq!(client.get_staked(&staker), 200);

    // Indices stay stable after withdrawal, and a position pays out once.
    let result = client.try_withdraw_position(&staker, &0);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::AlreadyWithdrawn),
        _ => unreachable!("Expected AlreadyWithdrawn error"),
    }

    let result = client.try_withdraw_position(&staker, &7);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::PositionNotFound),
        _ => unreachable!("Expected PositionNotFound error"),
    }
}

// ── Reward accrual & claims ──────────────────────────────────────────────────

#[test]
fn test_full_week_pays_exact_supply() {
    let (env, client, _vault, admin, stake_token, reward_token) = setup(0);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    // 604,800 units over 7 days: rate 1/s, no truncation.
    fund_rewards(&env, &client, &admin, &reward_token, 604_800, 0, WEEK);
    client.stake(&staker, &1_000, &0);

    env.ledger().set_timestamp(WEEK);
    assert_eq!(client.get_pending_reward(&staker, &reward_token), 604_800);

    let paid = client.claim_reward(&staker, &reward_token);
    assert_eq!(paid, 604_800);
    assert_eq!(balance(&env, &reward_token, &staker), 604_800);
    assert_eq!(client.get_pending_reward(&staker, &reward_token), 0);

    // A second claim finds nothing banked and moves nothing.
    assert_eq!(client.claim_reward(&staker, &reward_token), 0);
    assert_eq!(balance(&env, &reward_token, &staker), 604_800);
}

#[test]
fn test_rewards_split_pro_rata() {
    let (env, client, _vault, admin, stake_token, reward_token) = setup(0);

    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    mint(&env, &stake_token, &alice, 1_000);
    mint(&env, &stake_token, &bob, 1_000);

    fund_rewards(&env, &client, &admin, &reward_token, 400, 0, 400);
    client.stake(&alice, &300, &0);
    client.stake(&bob, &100, &0);

    env.ledger().set_timestamp(400);
    assert_eq!(client.get_pending_reward(&alice, &reward_token), 300);
    assert_eq!(client.get_pending_reward(&bob, &reward_token), 100);

    assert_eq!(client.claim_reward(&alice, &reward_token), 300);
    assert_eq!(client.claim_reward(&bob, &reward_token), 100);
}

#[test]
fn test_claim_rewards_pays_every_token() {
    let (env, client, _vault, admin, stake_token, reward_a) = setup(0);

    let reward_b = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    client.add_reward_token(&admin, &reward_b);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    fund_rewards(&env, &client, &admin, &reward_a, 1_000, 0, 1_000);
    fund_rewards(&env, &client, &admin, &reward_b, 2_000, 0, 1_000);
    client.stake(&staker, &1_000, &0);

    env.ledger().set_timestamp(1_000);
    client.claim_rewards(&staker);

    assert_eq!(balance(&env, &reward_a, &staker), 1_000);
    assert_eq!(balance(&env, &reward_b, &staker), 2_000);
}

#[test]
fn test_accrual_survives_checkpoints() {
    let (env, client, _vault, admin, stake_token, reward_token) = setup(0);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    fund_rewards(&env, &client, &admin, &reward_token, 1_000, 0, 1_000);
    client.stake(&staker, &500, &0);

    // A mid-window stake checkpoints the user; nothing may be lost.
    env.ledger().set_timestamp(400);
    client.stake(&staker, &500, &0);

    env.ledger().set_timestamp(1_000);
    assert_eq!(client.get_pending_reward(&staker, &reward_token), 1_000);
}

// ── Supply-zero emission pause ───────────────────────────────────────────────

#[test]
fn test_empty_pool_freezes_emission() {
    let (env, client, _vault, admin, stake_token, reward_token) = setup(0);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    fund_rewards(&env, &client, &admin, &reward_token, 604_800, 0, WEEK);
    client.stake(&staker, &1_000, &0);

    // Day 3: the pool empties. The withdrawal stamps the pause.
    env.ledger().set_timestamp(3 * DAY);
    client.withdraw(&staker, &1_000);

    let entry = client.get_schedules(&reward_token).get(0).unwrap();
    assert_eq!(entry.paused_at, 3 * DAY);

    // Day 5: supply returns. Two days of pause are credited; the nominal
    // window is untouched.
    env.ledger().set_timestamp(5 * DAY);
    client.stake(&staker, &1_000, &0);

    let entry = client.get_schedules(&reward_token).get(0).unwrap();
    assert_eq!(entry.paused_at, 0);
    assert_eq!(entry.total_paused_time, 2 * DAY);
    assert_eq!(entry.end_time, WEEK);

    // Earned: days 0-3 while solo, nothing while empty, days 5-7 after
    // restaking. Never more than was supplied.
    env.ledger().set_timestamp(WEEK);
    let expected = (3 * DAY + 2 * DAY) as i128;
    assert_eq!(client.get_pending_reward(&staker, &reward_token), expected);
    assert!(expected <= 604_800);
    assert_eq!(client.claim_reward(&staker, &reward_token), expected);
}

#[test]
fn test_emission_rate_view() {
    let (env, client, _vault, admin, _stake_token, reward_token) = setup(0);

    fund_rewards(&env, &client, &admin, &reward_token, 1_000, 100, 100);
    assert_eq!(client.get_emission_rate(&reward_token), 0); // not started

    env.ledger().set_timestamp(150);
    assert_eq!(client.get_emission_rate(&reward_token), 10);

    env.ledger().set_timestamp(200);
    assert_eq!(client.get_emission_rate(&reward_token), 0); // end is exclusive
}

// ── Reward supply administration ─────────────────────────────────────────────

#[test]
fn test_supply_rewards_moves_funds_to_vault() {
    let (env, client, vault, admin, _stake_token, reward_token) = setup(0);

    mint(&env, &reward_token, &admin, 5_000);
    client.supply_rewards(&admin, &reward_token, &5_000, &0, &1_000);

    assert_eq!(vault.get_balance(&reward_token), 5_000);
    assert_eq!(balance(&env, &reward_token, &admin), 0);

    let entry = client.get_schedules(&reward_token).get(0).unwrap();
    assert_eq!(entry.rate, 5);
    assert_eq!(entry.total_supplied, 5_000);
    assert_eq!(entry.end_time, 1_000);
}

#[test]
fn test_supply_rewards_validation() {
    let (env, client, _vault, admin, _stake_token, reward_token) = setup(0);

    let unknown = Address::generate(&env);
    let result = client.try_supply_rewards(&admin, &unknown, &1_000, &0, &100);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::TokenNotWhitelisted),
        _ => unreachable!("Expected TokenNotWhitelisted error"),
    }

    let result = client.try_supply_rewards(&admin, &reward_token, &0, &0, &100);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidAmount),
        _ => unreachable!("Expected InvalidAmount error"),
    }

    let result = client.try_supply_rewards(&admin, &reward_token, &1_000, &0, &0);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidDuration),
        _ => unreachable!("Expected InvalidDuration error"),
    }
}

#[test]
fn test_add_reward_token_rejects_duplicates() {
    let (env, client, _vault, admin, _stake_token, reward_token) = setup(0);

    let result = client.try_add_reward_token(&admin, &reward_token);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::TokenAlreadyWhitelisted),
        _ => unreachable!("Expected TokenAlreadyWhitelisted error"),
    }

    let intruder = Address::generate(&env);
    let other = Address::generate(&env);
    let result = client.try_add_reward_token(&intruder, &other);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Roles & operational pause ────────────────────────────────────────────────

#[test]
fn test_role_ladder() {
    let (env, client, _vault, admin, _stake_token, _reward_token) = setup(0);

    let pauser = Address::generate(&env);
    let freezer = Address::generate(&env);
    client.grant_role(&admin, &pauser, &Role::Pauser);
    client.grant_role(&admin, &freezer, &Role::Freezer);

    assert_eq!(client.get_role(&pauser), Some(Role::Pauser));
    assert_eq!(client.get_role(&freezer), Some(Role::Freezer));

    // A freezer sits below the pauser threshold.
    let result = client.try_pause(&freezer);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    // A pauser sits below the admin threshold.
    let result = client.try_set_min_lock(&pauser, &DAY);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    // Only admins hand out roles.
    let target = Address::generate(&env);
    let result = client.try_grant_role(&pauser, &target, &Role::Freezer);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    // The bootstrap admin cannot be revoked.
    let result = client.try_revoke_role(&admin, &admin);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    client.revoke_role(&admin, &pauser);
    assert_eq!(client.get_role(&pauser), None);
}

#[test]
fn test_pause_blocks_user_operations() {
    let (env, client, _vault, admin, stake_token, _reward_token) = setup(0);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);
    client.stake(&staker, &500, &0);

    client.pause(&admin);
    assert!(client.is_paused());

    let result = client.try_stake(&staker, &100, &0);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::ContractPaused),
        _ => unreachable!("Expected ContractPaused error"),
    }
    let result = client.try_withdraw(&staker, &100);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::ContractPaused),
        _ => unreachable!("Expected ContractPaused error"),
    }
    let result = client.try_claim_rewards(&staker);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::ContractPaused),
        _ => unreachable!("Expected ContractPaused error"),
    }

    client.unpause(&admin);
    assert!(!client.is_paused());
    client.withdraw(&staker, &100);
}

#[test]
fn test_set_min_lock_spares_existing_positions() {
    let (env, client, _vault, admin, stake_token, _reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);
    client.stake(&staker, &100, &0);

    client.set_min_lock(&admin, &(10 * DAY));
    assert_eq!(client.get_min_lock(), 10 * DAY);
    client.stake(&staker, &100, &0);

    let positions = client.get_positions(&staker);
    assert_eq!(positions.get(0).unwrap().unlock_time, DAY);
    assert_eq!(positions.get(1).unwrap().unlock_time, 10 * DAY);
}

// ── Compliance ───────────────────────────────────────────────────────────────

#[test]
fn test_blacklist_forces_exit_and_forfeits_rewards() {
    let (env, client, _vault, admin, stake_token, reward_token) = setup(DAY);

    let staker = Address::generate(&env);
    mint(&env, &stake_token, &staker, 1_000);

    fund_rewards(&env, &client, &admin, &reward_token, 1_000, 0, 1_000);
    client.stake(&staker, &1_000, &(30 * DAY));

    // Mid-window, deep inside the lock.
    env.ledger().set_timestamp(500);
    assert!(client.get_pending_reward(&staker, &reward_token) > 0);

    client.blacklist(&admin, &staker);

    // Principal comes back despite the lock; accrued rewards do not.
    assert!(client.is_blacklisted(&staker));
    assert_eq!(balance(&env, &stake_token, &staker), 1_000);
    assert_eq!(client.get_staked(&staker), 0);
    assert_eq!(client.get_total_staked(), 0);
    assert_eq!(client.get_pending_reward(&staker, &reward_token), 0);
    assert_eq!(balance(&env, &reward_token, &staker), 0);

    // Blacklisted accounts are shut out entirely.
    let result = client.try_stake(&staker, &100, &DAY);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Blacklisted),
        _ => unreachable!("Expected Blacklisted error"),
    }
    let result = client.try_claim_rewards(&staker);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Blacklisted),
        _ => unreachable!("Expected Blacklisted error"),
    }

    // The forfeiture survives reinstatement.
    client.unblacklist(&admin, &staker);
    assert!(!client.is_blacklisted(&staker));
    assert_eq!(client.get_pending_reward(&staker, &reward_token), 0);
    client.stake(&staker, &100, &DAY);
}

#[test]
fn test_blacklist_requires_freezer_and_rejects_repeats() {
    let (env, client, _vault, admin, _stake_token, _reward_token) = setup(0);

    let intruder = Address::generate(&env);
    let target = Address::generate(&env);

    let result = client.try_blacklist(&intruder, &target);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    let freezer = Address::generate(&env);
    client.grant_role(&admin, &freezer, &Role::Freezer);
    client.blacklist(&freezer, &target);

    let result = client.try_blacklist(&freezer, &target);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::AlreadyBlacklisted),
        _ => unreachable!("Expected AlreadyBlacklisted error"),
    }

    let result = client.try_unblacklist(&intruder, &target);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    client.unblacklist(&freezer, &target);

    let result = client.try_unblacklist(&freezer, &target);
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::NotBlacklisted),
        _ => unreachable!("Expected NotBlacklisted error"),
    }
}
