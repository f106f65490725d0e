//! Storage-level reward engine shared by both staking variants.
//!
//! Owns every reward ledger inside the calling contract's storage: the
//! whitelisted token registry, per-token schedules and pool accumulators,
//! per-(user, token) checkpoints, and the supply-zero pause state. The
//! variants differ only in how stake is represented, so they pass their
//! total and per-user stake balances in; everything else happens here.
//!
//! Every mutating contract entrypoint must call [`update_all`] (or
//! [`update_token`] for a single-token claim) before touching positions or
//! paying anything out, and must call [`sync_emission_pause`] again after
//! changing total staked supply so a zero-crossing is stamped at the
//! operation that caused it.

use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

use crate::accrual::{self, PoolAccrual, UserAccrual};
use crate::pause::{self, SupplyPauseState, Transition};
use crate::schedule::{self, RewardSchedule};

// ── Storage keys ─────────────────────────────────────────────────────────────

const REWARD_TOKENS: Symbol = symbol_short!("RWD_TOKS");
const PAUSE_STATE: Symbol = symbol_short!("PAUSE_ST");
const POOL_PREFIX: Symbol = symbol_short!("POOL");
const SCHEDULE_PREFIX: Symbol = symbol_short!("SCHED");
const USER_PREFIX: Symbol = symbol_short!("UACC");

fn pool_key(token: &Address) -> (Symbol, Address) {
    (POOL_PREFIX, token.clone())
}

fn schedule_key(token: &Address) -> (Symbol, Address) {
    (SCHEDULE_PREFIX, token.clone())
}

fn user_key(user: &Address, token: &Address) -> (Symbol, Address, Address) {
    (USER_PREFIX, user.clone(), token.clone())
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Registry errors; contracts map these into their own error enums.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RewardError {
    AlreadyWhitelisted,
    NotWhitelisted,
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Seeds the engine at contract initialization. The pool starts empty, so the
/// pause state begins in the zero-supply position.
pub fn init(env: &Env, now: u64) {
    env.storage()
        .instance()
        .set(&PAUSE_STATE, &SupplyPauseState::genesis(now));
    env.storage()
        .instance()
        .set(&REWARD_TOKENS, &Vec::<Address>::new(env));
}

pub fn reward_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&REWARD_TOKENS)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn is_reward_token(env: &Env, token: &Address) -> bool {
    reward_tokens(env).iter().any(|t| t == *token)
}

/// Whitelists a reward token and opens its (empty) ledgers.
pub fn add_reward_token(env: &Env, token: &Address, now: u64) -> Result<(), RewardError> {
    let mut tokens = reward_tokens(env);
    if tokens.iter().any(|t| t == *token) {
        return Err(RewardError::AlreadyWhitelisted);
    }
    tokens.push_back(token.clone());
    env.storage().instance().set(&REWARD_TOKENS, &tokens);
    env.storage().persistent().set(
        &pool_key(token),
        &PoolAccrual {
            last_update_time: now,
            reward_per_share_stored: 0,
        },
    );
    env.storage()
        .persistent()
        .set(&schedule_key(token), &Vec::<RewardSchedule>::new(env));
    Ok(())
}

// ── Schedules ────────────────────────────────────────────────────────────────

pub fn schedules(env: &Env, token: &Address) -> Vec<RewardSchedule> {
    env.storage()
        .persistent()
        .get(&schedule_key(token))
        .unwrap_or_else(|| Vec::new(env))
}

/// Appends a new emission window for a whitelisted token. Callers validate
/// amount and duration and run the accrual update first.
pub fn add_schedule(
    env: &Env,
    token: &Address,
    total_supplied: i128,
    start_time: u64,
    duration: u64,
) -> Result<RewardSchedule, RewardError> {
    if !is_reward_token(env, token) {
        return Err(RewardError::NotWhitelisted);
    }
    let entry = schedule::build(total_supplied, start_time, duration);
    let mut list = schedules(env, token);
    list.push_back(entry.clone());
    env.storage().persistent().set(&schedule_key(token), &list);
    Ok(entry)
}

// ── Pause controller ─────────────────────────────────────────────────────────

pub fn pause_state(env: &Env) -> SupplyPauseState {
    env.storage()
        .instance()
        .get(&PAUSE_STATE)
        .unwrap_or_else(|| SupplyPauseState::genesis(0))
}

/// Runs the supply-zero transition check against `total_staked` and applies
/// the outcome to every whitelisted token's schedules. Returns the transition
/// so the contract can publish an event on a crossing.
pub fn sync_emission_pause(env: &Env, total_staked: i128, now: u64) -> Transition {
    let mut state = pause_state(env);
    let transition = pause::transition(&mut state, total_staked, now);
    match transition {
        Transition::None => return transition,
        Transition::Paused => {
            for token in reward_tokens(env).iter() {
                let mut list = schedules(env, &token);
                schedule::pause_active(&mut list, now);
                env.storage().persistent().set(&schedule_key(&token), &list);
            }
        }
        Transition::Resumed { pause_duration } => {
            for token in reward_tokens(env).iter() {
                let mut list = schedules(env, &token);
                schedule::resume_paused(&mut list, pause_duration);
                env.storage().persistent().set(&schedule_key(&token), &list);
            }
        }
    }
    env.storage().instance().set(&PAUSE_STATE, &state);
    transition
}

// ── Accrual updates ──────────────────────────────────────────────────────────

fn load_pool(env: &Env, token: &Address) -> PoolAccrual {
    env.storage()
        .persistent()
        .get(&pool_key(token))
        .unwrap_or(PoolAccrual {
            last_update_time: 0,
            reward_per_share_stored: 0,
        })
}

pub fn pool(env: &Env, token: &Address) -> PoolAccrual {
    load_pool(env, token)
}

pub fn user_accrual(env: &Env, user: &Address, token: &Address) -> UserAccrual {
    env.storage()
        .persistent()
        .get(&user_key(user, token))
        .unwrap_or_else(UserAccrual::zero)
}

fn flush_token(env: &Env, token: &Address, total_staked: i128, now: u64) -> PoolAccrual {
    let mut pool = load_pool(env, token);
    let emitted = schedule::emitted_in(&schedules(env, token), pool.last_update_time, now);
    accrual::flush_pool(&mut pool, emitted, total_staked, now);
    env.storage().persistent().set(&pool_key(token), &pool);
    pool
}

/// Instantaneous emission rate for `token`: the sum over its schedules whose
/// window contains `now`.
pub fn emission_rate(env: &Env, token: &Address, now: u64) -> i128 {
    schedule::active_rate(&schedules(env, token), now)
}

fn settle_token(
    env: &Env,
    token: &Address,
    user: &Address,
    user_staked: i128,
    pool: &PoolAccrual,
) {
    let mut acc = user_accrual(env, user, token);
    acc.banked = accrual::earned(
        user_staked,
        pool.reward_per_share_stored,
        acc.reward_per_share_paid,
        acc.banked,
    );
    acc.reward_per_share_paid = pool.reward_per_share_stored;
    env.storage().persistent().set(&user_key(user, token), &acc);
}

/// The mandatory first step of every mutating operation: pause sync, then a
/// full accumulator flush for every whitelisted token, then a checkpoint
/// settlement for `user` when one is given.
pub fn update_all(
    env: &Env,
    user: Option<(&Address, i128)>,
    total_staked: i128,
    now: u64,
) -> Transition {
    let transition = sync_emission_pause(env, total_staked, now);
    for token in reward_tokens(env).iter() {
        let pool = flush_token(env, &token, total_staked, now);
        if let Some((user, user_staked)) = user {
            settle_token(env, &token, user, user_staked, &pool);
        }
    }
    transition
}

/// Single-token variant used by single-token claims. The pause sync still
/// runs globally; only `token`'s accumulator and checkpoint are flushed.
pub fn update_token(
    env: &Env,
    token: &Address,
    user: &Address,
    user_staked: i128,
    total_staked: i128,
    now: u64,
) -> Result<Transition, RewardError> {
    if !is_reward_token(env, token) {
        return Err(RewardError::NotWhitelisted);
    }
    let transition = sync_emission_pause(env, total_staked, now);
    let pool = flush_token(env, token, total_staked, now);
    settle_token(env, token, user, user_staked, &pool);
    Ok(transition)
}

// ── Banked rewards ───────────────────────────────────────────────────────────

/// Reads and zeroes the banked reward for one (user, token) pair.
pub fn take_banked(env: &Env, user: &Address, token: &Address) -> i128 {
    let mut acc = user_accrual(env, user, token);
    let amount = acc.banked;
    if amount != 0 {
        acc.banked = 0;
        env.storage().persistent().set(&user_key(user, token), &acc);
    }
    amount
}

/// Zeroes the banked reward for every whitelisted token without paying it
/// out. The forced-exit penalty path.
pub fn forfeit_banked(env: &Env, user: &Address) {
    for token in reward_tokens(env).iter() {
        let mut acc = user_accrual(env, user, &token);
        if acc.banked != 0 {
            acc.banked = 0;
            env.storage()
                .persistent()
                .set(&user_key(user, &token), &acc);
        }
    }
}

// ── Views ────────────────────────────────────────────────────────────────────

/// Real-time claimable reward for `user` on `token`, without mutating state.
pub fn pending(
    env: &Env,
    token: &Address,
    user: &Address,
    user_staked: i128,
    total_staked: i128,
    now: u64,
) -> i128 {
    let pool = load_pool(env, token);
    let emitted = schedule::emitted_in(&schedules(env, token), pool.last_update_time, now);
    let current_rps =
        accrual::reward_per_share(pool.reward_per_share_stored, emitted, total_staked);
    let acc = user_accrual(env, user, token);
    accrual::earned(user_staked, current_rps, acc.reward_per_share_paid, acc.banked)
}
