#![no_std]

//! Fungible-receipt staking engine.
//!
//! Users lock the stake token for at least the configured minimum duration
//! and accrue rewards in every whitelisted reward token according to
//! time-based emission schedules. Each stake opens a position; the user's
//! receipt balance is the sum of their live positions. Partial withdrawal
//! consumes unlocked positions oldest-first; exact per-position withdrawal is
//! also available. Reward custody lives in the vault contract, which pays out
//! on this contract's instruction.
//!
//! Every mutating entrypoint runs the shared accrual update first (pause
//! sync, accumulator flush, user checkpoint), then applies its effect, then
//! re-syncs the supply-zero pause controller if it changed total stake.

pub mod events;

use common::position::{self, PositionError, StakePosition};
use common::rewards::{self, RewardError};
use common::roles::{self, Role};
use common::schedule::RewardSchedule;
use common::{compliance, pause::Transition, reentrancy};
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol, Vec};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const VAULT: Symbol = symbol_short!("VAULT");
const MIN_LOCK: Symbol = symbol_short!("MIN_LOCK");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const OPS_PAUSED: Symbol = symbol_short!("OPS_PAUSE");

// Per-user persistent storage uses tuple keys: (prefix, user_address)
const USER_POSITIONS: Symbol = symbol_short!("POS");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    Blacklisted = 11,
    PositionNotFound = 20,
    TokenNotWhitelisted = 21,
    InvalidAmount = 30,
    InvalidDuration = 31,
    TokenAlreadyWhitelisted = 32,
    AlreadyBlacklisted = 33,
    NotBlacklisted = 34,
    StillLocked = 40,
    ContractPaused = 41,
    AlreadyWithdrawn = 42,
    InsufficientUnlocked = 50,
    Reentrancy = 51,
    TotalStakeUnderflow = 52,
}

impl From<PositionError> for ContractError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::InsufficientUnlocked => ContractError::InsufficientUnlocked,
            PositionError::StillLocked => ContractError::StillLocked,
            PositionError::AlreadyWithdrawn => ContractError::AlreadyWithdrawn,
            PositionError::NotFound => ContractError::PositionNotFound,
        }
    }
}

impl From<RewardError> for ContractError {
    fn from(err: RewardError) -> Self {
        match err {
            RewardError::AlreadyWhitelisted => ContractError::TokenAlreadyWhitelisted,
            RewardError::NotWhitelisted => ContractError::TokenNotWhitelisted,
        }
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token` – SAC address of the token users stake.
    /// * `vault`       – custodial vault this engine instructs for payouts.
    /// * `min_lock`    – minimum lock duration in seconds for new positions.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        vault: Address,
        min_lock: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        let now = env.ledger().timestamp();

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&VAULT, &vault);
        env.storage().instance().set(&MIN_LOCK, &min_lock);
        // TOTAL_STAKED starts at zero; unwrap_or(0) handles the absent key.

        rewards::init(&env, now);
        roles::bootstrap_admin(&env, &admin);

        events::publish_initialized(&env, admin, stake_token, vault, min_lock);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens under a lock of at least the global
    /// minimum. Returns the new position's index.
    ///
    /// The lock chosen here is frozen into the position; later changes to the
    /// global minimum never touch existing positions.
    pub fn stake(
        env: Env,
        staker: Address,
        amount: i128,
        lock: u64,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let mut positions = Self::positions(&env, &staker);

        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&staker, position::staked_balance(&positions))),
                total,
                now,
            ),
        );

        let min_lock: u64 = env.storage().instance().get(&MIN_LOCK).unwrap_or(0);
        let unlock_time = now.saturating_add(lock.max(min_lock));
        positions.push_back(StakePosition {
            amount,
            stake_time: now,
            unlock_time,
            withdrawn: false,
        });
        let index = positions.len() - 1;
        Self::store_positions(&env, &staker, &positions);

        let new_total = total.saturating_add(amount);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);
        // The supply just changed; stamp a zero-crossing at this operation.
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_staked(&env, staker, amount, unlock_time, index, new_total);

        reentrancy::exit(&env);
        Ok(index)
    }

    // ── Withdrawal ──────────────────────────────────────────────────────────

    /// Withdraw `amount` across unlocked positions, oldest first. Fully
    /// consumed positions are voided; the last one touched is split.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let mut positions = Self::positions(&env, &staker);

        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&staker, position::staked_balance(&positions))),
                total,
                now,
            ),
        );

        position::consume_fifo(&mut positions, amount, now)?;
        Self::store_positions(&env, &staker, &positions);
        let new_total = Self::decrease_total(&env, total, amount)?;
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        events::publish_withdrawn(&env, staker, amount, new_total);

        reentrancy::exit(&env);
        Ok(())
    }

    /// Withdraw one exact position by index. Fails while the position is
    /// still locked or once it has been withdrawn.
    pub fn withdraw_position(
        env: Env,
        staker: Address,
        index: u32,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let mut positions = Self::positions(&env, &staker);

        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&staker, position::staked_balance(&positions))),
                total,
                now,
            ),
        );

        let amount = position::consume_exact(&mut positions, index, now)?;
        Self::store_positions(&env, &staker, &positions);
        let new_total = Self::decrease_total(&env, total, amount)?;
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        events::publish_position_withdrawn(&env, staker, index, amount, new_total);

        reentrancy::exit(&env);
        Ok(amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim banked rewards in every whitelisted token, paid from the vault.
    pub fn claim_rewards(env: Env, staker: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let positions = Self::positions(&env, &staker);

        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&staker, position::staked_balance(&positions))),
                total,
                now,
            ),
        );

        for reward_token in rewards::reward_tokens(&env).iter() {
            Self::pay_banked(&env, &staker, &reward_token)?;
        }

        reentrancy::exit(&env);
        Ok(())
    }

    /// Claim banked rewards in a single token; only that token's accumulator
    /// is flushed. Returns the amount paid.
    pub fn claim_reward(
        env: Env,
        staker: Address,
        reward_token: Address,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let positions = Self::positions(&env, &staker);

        let transition = rewards::update_token(
            &env,
            &reward_token,
            &staker,
            position::staked_balance(&positions),
            total,
            now,
        )?;
        Self::publish_transition(&env, transition);

        let paid = Self::pay_banked(&env, &staker, &reward_token)?;

        reentrancy::exit(&env);
        Ok(paid)
    }

    // ── Admin: reward supply ────────────────────────────────────────────────

    /// Whitelist a new reward token. Admin only.
    pub fn add_reward_token(
        env: Env,
        caller: Address,
        reward_token: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Admin)?;

        let now = env.ledger().timestamp();
        rewards::add_reward_token(&env, &reward_token, now)?;

        events::publish_reward_token_added(&env, reward_token);
        Ok(())
    }

    /// Supply `amount` of a whitelisted reward token, emitted evenly over
    /// `[start_time, start_time + duration)`. The emission rate is floor
    /// divided; the remainder is never emitted. Tokens move from the caller
    /// into vault custody. Admin only.
    pub fn supply_rewards(
        env: Env,
        caller: Address,
        reward_token: Address,
        amount: i128,
        start_time: u64,
        duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Admin)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if duration == 0 {
            return Err(ContractError::InvalidDuration);
        }

        let now = env.ledger().timestamp();
        Self::publish_transition(&env, rewards::update_all(&env, None, Self::total(&env), now));

        let entry = rewards::add_schedule(&env, &reward_token, amount, start_time, duration)?;

        let vault: Address = Self::vault(&env)?;
        token::Client::new(&env, &reward_token).transfer(&caller, &vault, &amount);

        events::publish_schedule_added(&env, reward_token, entry);
        Ok(())
    }

    // ── Admin: configuration & roles ────────────────────────────────────────

    /// Update the minimum lock duration; affects only future stakes.
    pub fn set_min_lock(env: Env, caller: Address, min_lock: u64) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Admin)?;

        env.storage().instance().set(&MIN_LOCK, &min_lock);
        events::publish_min_lock_set(&env, min_lock);
        Ok(())
    }

    /// Halt user operations (stake/withdraw/claim). Pauser or above.
    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Pauser)?;
        env.storage().instance().set(&OPS_PAUSED, &true);
        events::publish_ops_pause_toggled(&env, true);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Pauser)?;
        env.storage().instance().remove(&OPS_PAUSED);
        events::publish_ops_pause_toggled(&env, false);
        Ok(())
    }

    pub fn grant_role(
        env: Env,
        caller: Address,
        target: Address,
        role: Role,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !roles::grant_role(&env, &caller, &target, role) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn revoke_role(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !roles::revoke_role(&env, &caller, &target) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    // ── Compliance ──────────────────────────────────────────────────────────

    /// Force `account` out of the pool: every position is voided regardless
    /// of lock state, the principal is returned, and all banked rewards are
    /// forfeited. The forfeiture is permanent, surviving a later
    /// `unblacklist`. Freezer or above.
    pub fn blacklist(env: Env, caller: Address, account: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Freezer)?;
        if compliance::is_blacklisted(&env, &account) {
            return Err(ContractError::AlreadyBlacklisted);
        }
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);
        let mut positions = Self::positions(&env, &account);

        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&account, position::staked_balance(&positions))),
                total,
                now,
            ),
        );

        let principal = position::void_all(&mut positions);
        Self::store_positions(&env, &account, &positions);
        rewards::forfeit_banked(&env, &account);
        compliance::set_blacklisted(&env, &account, true);

        if principal > 0 {
            let new_total = Self::decrease_total(&env, total, principal)?;
            Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

            let stake_token = Self::stake_token(&env)?;
            token::Client::new(&env, &stake_token).transfer(
                &env.current_contract_address(),
                &account,
                &principal,
            );
        }

        events::publish_blacklist_toggled(&env, account, true, principal);

        reentrancy::exit(&env);
        Ok(())
    }

    /// Lift the blacklist. Voided positions and forfeited rewards stay gone.
    pub fn unblacklist(env: Env, caller: Address, account: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Freezer)?;
        if !compliance::is_blacklisted(&env, &account) {
            return Err(ContractError::NotBlacklisted);
        }
        compliance::set_blacklisted(&env, &account, false);
        events::publish_blacklist_toggled(&env, account, false, 0);
        Ok(())
    }

    // ── View functions ──────────────────────────────────────────────────────

    /// Sum of the user's live positions; equals their receipt balance.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        position::staked_balance(&Self::positions(&env, &staker))
    }

    pub fn get_unlocked(env: Env, staker: Address) -> i128 {
        let now = env.ledger().timestamp();
        position::unlocked_balance(&Self::positions(&env, &staker), now)
    }

    pub fn get_locked(env: Env, staker: Address) -> i128 {
        let now = env.ledger().timestamp();
        position::locked_balance(&Self::positions(&env, &staker), now)
    }

    pub fn get_positions(env: Env, staker: Address) -> Vec<StakePosition> {
        Self::positions(&env, &staker)
    }

    /// Real-time claimable reward for one token, without mutating state.
    pub fn get_pending_reward(env: Env, staker: Address, reward_token: Address) -> i128 {
        let now = env.ledger().timestamp();
        let staked = position::staked_balance(&Self::positions(&env, &staker));
        rewards::pending(&env, &reward_token, &staker, staked, Self::total(&env), now)
    }

    pub fn get_total_staked(env: Env) -> i128 {
        Self::total(&env)
    }

    pub fn get_reward_tokens(env: Env) -> Vec<Address> {
        rewards::reward_tokens(&env)
    }

    pub fn get_schedules(env: Env, reward_token: Address) -> Vec<RewardSchedule> {
        rewards::schedules(&env, &reward_token)
    }

    /// Instantaneous emission rate for a token (units per second).
    pub fn get_emission_rate(env: Env, reward_token: Address) -> i128 {
        rewards::emission_rate(&env, &reward_token, env.ledger().timestamp())
    }

    pub fn get_min_lock(env: Env) -> u64 {
        env.storage().instance().get(&MIN_LOCK).unwrap_or(0)
    }

    pub fn is_blacklisted(env: Env, account: Address) -> bool {
        compliance::is_blacklisted(&env, &account)
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&OPS_PAUSED).unwrap_or(false)
    }

    pub fn get_role(env: Env, account: Address) -> Option<Role> {
        roles::get_role(&env, &account)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_ops_active(env: &Env) -> Result<(), ContractError> {
        if env.storage().instance().get(&OPS_PAUSED).unwrap_or(false) {
            return Err(ContractError::ContractPaused);
        }
        Ok(())
    }

    fn require_not_blacklisted(env: &Env, account: &Address) -> Result<(), ContractError> {
        if compliance::is_blacklisted(env, account) {
            return Err(ContractError::Blacklisted);
        }
        Ok(())
    }

    fn require_role(env: &Env, caller: &Address, min_role: Role) -> Result<(), ContractError> {
        if !roles::require_role(env, caller, &min_role) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn enter_guard(env: &Env) -> Result<(), ContractError> {
        if !reentrancy::enter(env) {
            return Err(ContractError::Reentrancy);
        }
        Ok(())
    }

    fn total(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    /// Decrement the total; an underflow is an invariant violation and aborts
    /// rather than clamping.
    fn decrease_total(env: &Env, total: i128, amount: i128) -> Result<i128, ContractError> {
        let new_total = total
            .checked_sub(amount)
            .filter(|t| *t >= 0)
            .ok_or(ContractError::TotalStakeUnderflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);
        Ok(new_total)
    }

    fn stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn vault(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&VAULT)
            .ok_or(ContractError::NotInitialized)
    }

    fn positions(env: &Env, staker: &Address) -> Vec<StakePosition> {
        env.storage()
            .persistent()
            .get(&(USER_POSITIONS, staker.clone()))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn store_positions(env: &Env, staker: &Address, positions: &Vec<StakePosition>) {
        env.storage()
            .persistent()
            .set(&(USER_POSITIONS, staker.clone()), positions);
    }

    /// Take the user's banked amount for `reward_token` and instruct the
    /// vault to pay it. A vault failure traps and rolls the claim back.
    fn pay_banked(
        env: &Env,
        staker: &Address,
        reward_token: &Address,
    ) -> Result<i128, ContractError> {
        let amount = rewards::take_banked(env, staker, reward_token);
        if amount > 0 {
            let vault_addr = Self::vault(env)?;
            vault::VaultContractClient::new(env, &vault_addr).pay_reward(
                &env.current_contract_address(),
                staker,
                reward_token,
                &amount,
            );
            events::publish_reward_claimed(env, staker.clone(), reward_token.clone(), amount);
        }
        Ok(amount)
    }

    fn publish_transition(env: &Env, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Paused => events::publish_emission_pause_toggled(env, true, 0),
            Transition::Resumed { pause_duration } => {
                events::publish_emission_pause_toggled(env, false, pause_duration)
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test;
