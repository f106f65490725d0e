#![no_std]

//! NFT-receipt staking engine.
//!
//! Each stake mints a uniquely numbered receipt bound to one [`StakeNft`]
//! record. Withdrawal is exact and whole: a receipt is redeemed for its full
//! amount or not at all, with batch variants iterating a caller-supplied or
//! self-discovered id list. Receipts are transferable; the lock travels with
//! the receipt and the accrual checkpoints of both parties are settled at the
//! moment of transfer.
//!
//! Compliance distinguishes two holds. Freezing blocks receipt transfer only;
//! a frozen account still stakes, claims, and withdraws. Blacklisting is the
//! forced exit shared with the fungible variant: positions voided, rewards
//! forfeited, principal returned.

pub mod events;

use common::rewards::{self, RewardError};
use common::roles::{self, Role};
use common::schedule::RewardSchedule;
use common::{compliance, pause::Transition, reentrancy};
use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const VAULT: Symbol = symbol_short!("VAULT");
const MIN_LOCK: Symbol = symbol_short!("MIN_LOCK");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const OPS_PAUSED: Symbol = symbol_short!("OPS_PAUSE");
const NEXT_ID: Symbol = symbol_short!("NEXT_ID");

// Persistent storage uses tuple keys: (prefix, id) and (prefix, user_address)
const NFT_PREFIX: Symbol = symbol_short!("NFT");
const OWNED_PREFIX: Symbol = symbol_short!("OWNED");
const USER_STAKE_PREFIX: Symbol = symbol_short!("USTAKE");

// ── Types ────────────────────────────────────────────────────────────────────

/// One receipt-bound stake record. The lock is fixed at minting and follows
/// the receipt through transfers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeNft {
    pub owner: Address,
    pub amount: i128,
    pub stake_time: u64,
    pub unlock_time: u64,
    pub withdrawn: bool,
}

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    Blacklisted = 11,
    Frozen = 12,
    NftNotFound = 20,
    TokenNotWhitelisted = 21,
    NotNftOwner = 22,
    InvalidAmount = 30,
    InvalidDuration = 31,
    TokenAlreadyWhitelisted = 32,
    AlreadyBlacklisted = 33,
    NotBlacklisted = 34,
    AlreadyFrozen = 35,
    NotFrozen = 36,
    StillLocked = 40,
    ContractPaused = 41,
    AlreadyWithdrawn = 42,
    Reentrancy = 51,
    TotalStakeUnderflow = 52,
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
pub struct NftStakingContract;

#[contractimpl]
impl NftStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

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
        env.storage().instance().set(&NEXT_ID, &1u64);

        rewards::init(&env, now);
        roles::bootstrap_admin(&env, &admin);

        events::publish_initialized(&env, admin, stake_token, vault, min_lock);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens and mint a receipt for them. Returns the
    /// new receipt id. Ids start at 1 and are never reused.
    pub fn stake(
        env: Env,
        staker: Address,
        amount: i128,
        lock: u64,
    ) -> Result<u64, ContractError> {
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

        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&staker, Self::user_stake(&env, &staker))), total, now),
        );

        let min_lock: u64 = env.storage().instance().get(&MIN_LOCK).unwrap_or(0);
        let unlock_time = now.saturating_add(lock.max(min_lock));

        let id: u64 = env.storage().instance().get(&NEXT_ID).unwrap_or(1);
        env.storage().instance().set(&NEXT_ID, &(id + 1));
        Self::store_nft(
            &env,
            id,
            &StakeNft {
                owner: staker.clone(),
                amount,
                stake_time: now,
                unlock_time,
                withdrawn: false,
            },
        );

        let mut owned = Self::owned(&env, &staker);
        owned.push_back(id);
        Self::store_owned(&env, &staker, &owned);
        Self::set_user_stake(&env, &staker, Self::user_stake(&env, &staker).saturating_add(amount));

        let new_total = total.saturating_add(amount);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_nft_staked(&env, staker, id, amount, unlock_time, new_total);

        reentrancy::exit(&env);
        Ok(id)
    }

    // ── Withdrawal ──────────────────────────────────────────────────────────

    /// Redeem one receipt for its full amount. No partial withdrawal exists
    /// in this variant.
    pub fn withdraw_nft(env: Env, staker: Address, nft_id: u64) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);

        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&staker, Self::user_stake(&env, &staker))), total, now),
        );

        let amount = Self::redeem(&env, &staker, nft_id, now)?;
        let new_total = Self::decrease_total(&env, total, amount)?;
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        events::publish_nft_withdrawn(&env, staker, nft_id, amount, new_total);

        reentrancy::exit(&env);
        Ok(amount)
    }

    /// Redeem a caller-supplied list of receipts atomically: any invalid or
    /// still-locked id fails the whole batch.
    pub fn withdraw_batch(
        env: Env,
        staker: Address,
        nft_ids: Vec<u64>,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        if nft_ids.is_empty() {
            return Err(ContractError::InvalidAmount);
        }
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);

        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&staker, Self::user_stake(&env, &staker))), total, now),
        );

        let mut amount: i128 = 0;
        let mut redeemed: Vec<(u64, i128)> = Vec::new(&env);
        for nft_id in nft_ids.iter() {
            let released = Self::redeem(&env, &staker, nft_id, now)?;
            amount = amount.saturating_add(released);
            redeemed.push_back((nft_id, released));
        }

        let new_total = Self::decrease_total(&env, total, amount)?;
        Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

        let stake_token = Self::stake_token(&env)?;
        token::Client::new(&env, &stake_token).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        for (nft_id, released) in redeemed.iter() {
            events::publish_nft_withdrawn(&env, staker.clone(), nft_id, released, new_total);
        }

        reentrancy::exit(&env);
        Ok(amount)
    }

    /// Redeem every currently unlocked receipt the caller owns. Locked ones
    /// stay put; redeeming nothing is not an error.
    pub fn withdraw_all(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &staker)?;
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);

        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&staker, Self::user_stake(&env, &staker))), total, now),
        );

        let mut amount: i128 = 0;
        let mut redeemed: Vec<(u64, i128)> = Vec::new(&env);
        for nft_id in Self::owned(&env, &staker).iter() {
            if let Some(nft) = Self::nft(&env, nft_id) {
                if !nft.withdrawn && nft.unlock_time <= now {
                    let released = Self::redeem(&env, &staker, nft_id, now)?;
                    amount = amount.saturating_add(released);
                    redeemed.push_back((nft_id, released));
                }
            }
        }

        if amount > 0 {
            let new_total = Self::decrease_total(&env, total, amount)?;
            Self::publish_transition(&env, rewards::sync_emission_pause(&env, new_total, now));

            let stake_token = Self::stake_token(&env)?;
            token::Client::new(&env, &stake_token).transfer(
                &env.current_contract_address(),
                &staker,
                &amount,
            );

            for (nft_id, released) in redeemed.iter() {
                events::publish_nft_withdrawn(&env, staker.clone(), nft_id, released, new_total);
            }
        }

        reentrancy::exit(&env);
        Ok(amount)
    }

    // ── Receipt transfer ────────────────────────────────────────────────────

    /// Move a receipt, and the stake it represents, to a new owner. The lock
    /// is unchanged. Both parties' reward checkpoints are settled at their
    /// pre-transfer balances first, so accrued reward stays with the sender.
    ///
    /// Blocked while the sender is frozen or either party is blacklisted.
    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        nft_id: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        from.require_auth();
        Self::require_ops_active(&env)?;
        Self::require_not_blacklisted(&env, &from)?;
        Self::require_not_blacklisted(&env, &to)?;
        if compliance::is_frozen(&env, &from) {
            return Err(ContractError::Frozen);
        }

        let mut nft = Self::nft(&env, nft_id).ok_or(ContractError::NftNotFound)?;
        if nft.owner != from {
            return Err(ContractError::NotNftOwner);
        }
        if nft.withdrawn {
            return Err(ContractError::AlreadyWithdrawn);
        }
        Self::enter_guard(&env)?;

        let now = env.ledger().timestamp();
        let total = Self::total(&env);

        // Two settlements at the same instant; the second flush is a no-op on
        // the pool accumulators.
        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&from, Self::user_stake(&env, &from))), total, now),
        );
        rewards::update_all(&env, Some((&to, Self::user_stake(&env, &to))), total, now);

        let mut from_owned = Self::owned(&env, &from);
        if let Some(pos) = from_owned.first_index_of(nft_id) {
            from_owned.remove(pos);
        }
        Self::store_owned(&env, &from, &from_owned);

        let mut to_owned = Self::owned(&env, &to);
        to_owned.push_back(nft_id);
        Self::store_owned(&env, &to, &to_owned);

        Self::set_user_stake(
            &env,
            &from,
            Self::user_stake(&env, &from).saturating_sub(nft.amount),
        );
        Self::set_user_stake(&env, &to, Self::user_stake(&env, &to).saturating_add(nft.amount));

        let amount = nft.amount;
        nft.owner = to.clone();
        Self::store_nft(&env, nft_id, &nft);

        events::publish_nft_transferred(&env, from, to, nft_id, amount);

        reentrancy::exit(&env);
        Ok(())
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
        Self::publish_transition(
            &env,
            rewards::update_all(
                &env,
                Some((&staker, Self::user_stake(&env, &staker))),
                Self::total(&env),
                now,
            ),
        );

        for reward_token in rewards::reward_tokens(&env).iter() {
            Self::pay_banked(&env, &staker, &reward_token)?;
        }

        reentrancy::exit(&env);
        Ok(())
    }

    /// Claim banked rewards in a single token. Returns the amount paid.
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
        let transition = rewards::update_token(
            &env,
            &reward_token,
            &staker,
            Self::user_stake(&env, &staker),
            Self::total(&env),
            now,
        )?;
        Self::publish_transition(&env, transition);

        let paid = Self::pay_banked(&env, &staker, &reward_token)?;

        reentrancy::exit(&env);
        Ok(paid)
    }

    // ── Admin: reward supply ────────────────────────────────────────────────

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

    pub fn set_min_lock(env: Env, caller: Address, min_lock: u64) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Admin)?;

        env.storage().instance().set(&MIN_LOCK, &min_lock);
        events::publish_min_lock_set(&env, min_lock);
        Ok(())
    }

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

    /// Block receipt transfers from `account`. Staking, claiming, and
    /// withdrawing stay available; nothing is forfeited. Freezer or above.
    pub fn freeze(env: Env, caller: Address, account: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Freezer)?;
        if compliance::is_frozen(&env, &account) {
            return Err(ContractError::AlreadyFrozen);
        }
        compliance::set_frozen(&env, &account, true);
        events::publish_freeze_toggled(&env, account, true);
        Ok(())
    }

    pub fn unfreeze(env: Env, caller: Address, account: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, &caller, Role::Freezer)?;
        if !compliance::is_frozen(&env, &account) {
            return Err(ContractError::NotFrozen);
        }
        compliance::set_frozen(&env, &account, false);
        events::publish_freeze_toggled(&env, account, false);
        Ok(())
    }

    /// Force `account` out: every receipt is voided regardless of lock state,
    /// the principal is returned, and banked rewards are forfeited for good.
    /// Freezer or above.
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

        Self::publish_transition(
            &env,
            rewards::update_all(&env, Some((&account, Self::user_stake(&env, &account))), total, now),
        );

        let mut principal: i128 = 0;
        for nft_id in Self::owned(&env, &account).iter() {
            if let Some(mut nft) = Self::nft(&env, nft_id) {
                if !nft.withdrawn {
                    principal = principal.saturating_add(nft.amount);
                    nft.withdrawn = true;
                    Self::store_nft(&env, nft_id, &nft);
                }
            }
        }
        Self::store_owned(&env, &account, &Vec::new(&env));
        Self::set_user_stake(&env, &account, 0);
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

    /// Lift the blacklist. Voided receipts and forfeited rewards stay gone.
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

    /// Total stake behind the receipts `staker` holds.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        Self::user_stake(&env, &staker)
    }

    pub fn get_unlocked(env: Env, staker: Address) -> i128 {
        let now = env.ledger().timestamp();
        let mut total: i128 = 0;
        for nft_id in Self::owned(&env, &staker).iter() {
            if let Some(nft) = Self::nft(&env, nft_id) {
                if !nft.withdrawn && nft.unlock_time <= now {
                    total = total.saturating_add(nft.amount);
                }
            }
        }
        total
    }

    pub fn get_locked(env: Env, staker: Address) -> i128 {
        let now = env.ledger().timestamp();
        let mut total: i128 = 0;
        for nft_id in Self::owned(&env, &staker).iter() {
            if let Some(nft) = Self::nft(&env, nft_id) {
                if !nft.withdrawn && nft.unlock_time > now {
                    total = total.saturating_add(nft.amount);
                }
            }
        }
        total
    }

    pub fn get_nft(env: Env, nft_id: u64) -> Option<StakeNft> {
        Self::nft(&env, nft_id)
    }

    /// Ids of the live receipts `staker` holds, in acquisition order.
    pub fn get_owned(env: Env, staker: Address) -> Vec<u64> {
        Self::owned(&env, &staker)
    }

    pub fn get_pending_reward(env: Env, staker: Address, reward_token: Address) -> i128 {
        let now = env.ledger().timestamp();
        rewards::pending(
            &env,
            &reward_token,
            &staker,
            Self::user_stake(&env, &staker),
            Self::total(&env),
            now,
        )
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

    pub fn get_emission_rate(env: Env, reward_token: Address) -> i128 {
        rewards::emission_rate(&env, &reward_token, env.ledger().timestamp())
    }

    pub fn get_min_lock(env: Env) -> u64 {
        env.storage().instance().get(&MIN_LOCK).unwrap_or(0)
    }

    pub fn is_blacklisted(env: Env, account: Address) -> bool {
        compliance::is_blacklisted(&env, &account)
    }

    pub fn is_frozen(env: Env, account: Address) -> bool {
        compliance::is_frozen(&env, &account)
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

    fn nft(env: &Env, nft_id: u64) -> Option<StakeNft> {
        env.storage().persistent().get(&(NFT_PREFIX, nft_id))
    }

    fn store_nft(env: &Env, nft_id: u64, nft: &StakeNft) {
        env.storage().persistent().set(&(NFT_PREFIX, nft_id), nft);
    }

    fn owned(env: &Env, staker: &Address) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&(OWNED_PREFIX, staker.clone()))
            .unwrap_or_else(|| Vec::new(env))
    }

    fn store_owned(env: &Env, staker: &Address, owned: &Vec<u64>) {
        env.storage()
            .persistent()
            .set(&(OWNED_PREFIX, staker.clone()), owned);
    }

    fn user_stake(env: &Env, staker: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(USER_STAKE_PREFIX, staker.clone()))
            .unwrap_or(0)
    }

    fn set_user_stake(env: &Env, staker: &Address, amount: i128) {
        env.storage()
            .persistent()
            .set(&(USER_STAKE_PREFIX, staker.clone()), &amount);
    }

    /// Validate and void one receipt, keeping the owned list and the cached
    /// stake balance in step. Returns the released amount.
    fn redeem(
        env: &Env,
        staker: &Address,
        nft_id: u64,
        now: u64,
    ) -> Result<i128, ContractError> {
        let mut nft = Self::nft(env, nft_id).ok_or(ContractError::NftNotFound)?;
        if nft.owner != *staker {
            return Err(ContractError::NotNftOwner);
        }
        if nft.withdrawn {
            return Err(ContractError::AlreadyWithdrawn);
        }
        if nft.unlock_time > now {
            return Err(ContractError::StillLocked);
        }
        nft.withdrawn = true;
        Self::store_nft(env, nft_id, &nft);

        let mut owned = Self::owned(env, staker);
        if let Some(pos) = owned.first_index_of(nft_id) {
            owned.remove(pos);
        }
        Self::store_owned(env, staker, &owned);
        Self::set_user_stake(env, staker, Self::user_stake(env, staker).saturating_sub(nft.amount));

        Ok(nft.amount)
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
