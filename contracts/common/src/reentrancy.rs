//! Reentrancy guard for entrypoints that perform external calls after
//! internal bookkeeping.
//!
//! The flag lives in instance storage: `enter` trips if an invocation of the
//! same contract is already inside a guarded section, `exit` clears it before
//! the entrypoint returns. A trapped invocation rolls the flag back together
//! with everything else.

use soroban_sdk::{symbol_short, Env, Symbol};

const GUARD: Symbol = symbol_short!("REENTER");

/// Marks the guarded section as entered. Returns `false` when the section is
/// already active, in which case the caller must abort.
pub fn enter(env: &Env) -> bool {
    if env.storage().instance().get(&GUARD).unwrap_or(false) {
        return false;
    }
    env.storage().instance().set(&GUARD, &true);
    true
}

/// Clears the guard at the end of the guarded section.
pub fn exit(env: &Env) {
    env.storage().instance().remove(&GUARD);
}
