//! Blacklist and freeze flags consulted before mutating operations.
//!
//! Blacklist is the hard hold: the account is forced out, rewards are
//! forfeited, and every mutating entrypoint rejects it until cleared. Freeze
//! is the soft hold used by the NFT variant: it blocks receipt transfer only,
//! leaving staking, claiming, and withdrawing untouched.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

const BLACKLIST_PREFIX: Symbol = symbol_short!("BLCK");
const FREEZE_PREFIX: Symbol = symbol_short!("FRZN");

fn blacklist_key(account: &Address) -> (Symbol, Address) {
    (BLACKLIST_PREFIX, account.clone())
}

fn freeze_key(account: &Address) -> (Symbol, Address) {
    (FREEZE_PREFIX, account.clone())
}

pub fn set_blacklisted(env: &Env, account: &Address, blacklisted: bool) {
    let key = blacklist_key(account);
    if blacklisted {
        env.storage().persistent().set(&key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn is_blacklisted(env: &Env, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&blacklist_key(account))
        .unwrap_or(false)
}

pub fn set_frozen(env: &Env, account: &Address, frozen: bool) {
    let key = freeze_key(account);
    if frozen {
        env.storage().persistent().set(&key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn is_frozen(env: &Env, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&freeze_key(account))
        .unwrap_or(false)
}
