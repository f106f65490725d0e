#![allow(deprecated)] // events().publish migration tracked separately

use common::schedule::RewardSchedule;
use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub stake_token: Address,
    pub vault: Address,
    pub min_lock: u64,
    pub timestamp: u64,
}

/// Fired when a user opens a position.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub unlock_time: u64,
    pub position_index: u32,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired on a FIFO withdrawal spanning one or more positions.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired on an exact single-position withdrawal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionWithdrawnEvent {
    pub staker: Address,
    pub position_index: u32,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when the vault pays a reward out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub staker: Address,
    pub reward_token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when a reward token is whitelisted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardTokenAddedEvent {
    pub reward_token: Address,
    pub timestamp: u64,
}

/// Fired when an emission schedule is created.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleAddedEvent {
    pub reward_token: Address,
    pub total_supplied: i128,
    pub rate: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub timestamp: u64,
}

/// Fired when the minimum lock duration changes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinLockSetEvent {
    pub min_lock: u64,
    pub timestamp: u64,
}

/// Fired when the supply-zero controller pauses or resumes emission.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmissionPauseToggledEvent {
    pub paused: bool,
    pub pause_duration: u64,
    pub timestamp: u64,
}

/// Fired when an account is blacklisted or cleared.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlacklistToggledEvent {
    pub account: Address,
    pub blacklisted: bool,
    pub principal_returned: i128,
    pub timestamp: u64,
}

/// Fired when user operations are paused or resumed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpsPauseToggledEvent {
    pub paused: bool,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    stake_token: Address,
    vault: Address,
    min_lock: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            stake_token,
            vault,
            min_lock,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    amount: i128,
    unlock_time: u64,
    position_index: u32,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            unlock_time,
            position_index,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_position_withdrawn(
    env: &Env,
    staker: Address,
    position_index: u32,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("POS_WDRN"), staker.clone()),
        PositionWithdrawnEvent {
            staker,
            position_index,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(env: &Env, staker: Address, reward_token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLMD"), staker.clone()),
        RewardClaimedEvent {
            staker,
            reward_token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_token_added(env: &Env, reward_token: Address) {
    env.events().publish(
        (symbol_short!("RWD_TOK"),),
        RewardTokenAddedEvent {
            reward_token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_schedule_added(env: &Env, reward_token: Address, entry: RewardSchedule) {
    env.events().publish(
        (symbol_short!("SCHED"), reward_token.clone()),
        ScheduleAddedEvent {
            reward_token,
            total_supplied: entry.total_supplied,
            rate: entry.rate,
            start_time: entry.start_time,
            end_time: entry.end_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_min_lock_set(env: &Env, min_lock: u64) {
    env.events().publish(
        (symbol_short!("LOCK_SET"),),
        MinLockSetEvent {
            min_lock,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emission_pause_toggled(env: &Env, paused: bool, pause_duration: u64) {
    env.events().publish(
        (symbol_short!("EMIT_PSE"),),
        EmissionPauseToggledEvent {
            paused,
            pause_duration,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_blacklist_toggled(
    env: &Env,
    account: Address,
    blacklisted: bool,
    principal_returned: i128,
) {
    env.events().publish(
        (symbol_short!("BLCK"), account.clone()),
        BlacklistToggledEvent {
            account,
            blacklisted,
            principal_returned,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ops_pause_toggled(env: &Env, paused: bool) {
    env.events().publish(
        (symbol_short!("OPS_PSE"),),
        OpsPauseToggledEvent {
            paused,
            timestamp: env.ledger().timestamp(),
        },
    );
}
