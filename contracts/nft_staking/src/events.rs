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

/// Fired when a stake mints a receipt.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NftStakedEvent {
    pub staker: Address,
    pub nft_id: u64,
    pub amount: i128,
    pub unlock_time: u64,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired once per receipt redeemed, including inside batch withdrawals.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NftWithdrawnEvent {
    pub staker: Address,
    pub nft_id: u64,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a receipt changes hands.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NftTransferredEvent {
    pub from: Address,
    pub to: Address,
    pub nft_id: u64,
    pub amount: i128,
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

/// Fired when an account's transfer freeze is set or cleared.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezeToggledEvent {
    pub account: Address,
    pub frozen: bool,
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

pub fn publish_nft_staked(
    env: &Env,
    staker: Address,
    nft_id: u64,
    amount: i128,
    unlock_time: u64,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("NFT_STKD"), staker.clone()),
        NftStakedEvent {
            staker,
            nft_id,
            amount,
            unlock_time,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_nft_withdrawn(
    env: &Env,
    staker: Address,
    nft_id: u64,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("NFT_WDRN"), staker.clone()),
        NftWithdrawnEvent {
            staker,
            nft_id,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_nft_transferred(env: &Env, from: Address, to: Address, nft_id: u64, amount: i128) {
    env.events().publish(
        (symbol_short!("NFT_XFER"), from.clone()),
        NftTransferredEvent {
            from,
            to,
            nft_id,
            amount,
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

pub fn publish_freeze_toggled(env: &Env, account: Address, frozen: bool) {
    env.events().publish(
        (symbol_short!("FRZN"), account.clone()),
        FreezeToggledEvent {
            account,
            frozen,
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
