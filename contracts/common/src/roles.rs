//! Role ladder gating administrative operations.
//!
//! Three ranks with strictly increasing authority:
//! - `Freezer` – compliance actions only (blacklist / freeze toggles).
//! - `Pauser`  – compliance actions plus pausing contract operations.
//! - `Admin`   – everything: token whitelisting, reward supply, recovery,
//!   and granting/revoking roles.
//!
//! Callers must have already authenticated the address via `require_auth`;
//! this module only answers "does this address hold at least rank X".

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage keys ─────────────────────────────────────────────────────────────

const ROLE_PREFIX: Symbol = symbol_short!("ROLE");
const ROOT_ADMIN: Symbol = symbol_short!("ROOT_ADM");

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

// ── Role enum ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Freezer = 1,
    Pauser = 2,
    Admin = 3,
}

impl Role {
    pub fn rank(&self) -> u32 {
        match self {
            Role::Freezer => 1,
            Role::Pauser => 2,
            Role::Admin => 3,
        }
    }

    pub fn has_at_least(&self, min_role: &Role) -> bool {
        self.rank() >= min_role.rank()
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn role_key(account: &Address) -> (Symbol, Address) {
    (ROLE_PREFIX, account.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core functions ───────────────────────────────────────────────────────────

/// Assigns a role. Callers must verify authorization beforehand.
pub fn set_role(env: &Env, account: &Address, role: Role) {
    let key = role_key(account);
    env.storage().persistent().set(&key, &role);
    extend_ttl(env, &key);
}

/// Role held by `account`, if any.
pub fn get_role(env: &Env, account: &Address) -> Option<Role> {
    let key = role_key(account);
    let role: Option<Role> = env.storage().persistent().get(&key);
    if role.is_some() {
        extend_ttl(env, &key);
    }
    role
}

pub fn remove_role(env: &Env, account: &Address) {
    env.storage().persistent().remove(&role_key(account));
}

/// Guard: does `caller` hold at least `min_role`?
pub fn require_role(env: &Env, caller: &Address, min_role: &Role) -> bool {
    match get_role(env, caller) {
        Some(role) => role.has_at_least(min_role),
        None => false,
    }
}

// ── Bootstrap & delegation ───────────────────────────────────────────────────

/// Records the initializing admin and assigns them the top rank.
pub fn bootstrap_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&ROOT_ADMIN, admin);
    set_role(env, admin, Role::Admin);
}

/// The initializing admin address, if set.
pub fn root_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&ROOT_ADMIN)
}

/// Grants `role` to `target`. Only an `Admin` may call this.
/// Returns `false` when the caller lacks the rank.
pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) -> bool {
    if !require_role(env, caller, &Role::Admin) {
        return false;
    }
    set_role(env, target, role);
    true
}

/// Removes `target`'s role entirely. Only an `Admin` may call this, and the
/// root admin cannot be demoted.
pub fn revoke_role(env: &Env, caller: &Address, target: &Address) -> bool {
    if !require_role(env, caller, &Role::Admin) {
        return false;
    }
    if root_admin(env).is_some_and(|root| root == *target) {
        return false;
    }
    remove_role(env, target);
    true
}
