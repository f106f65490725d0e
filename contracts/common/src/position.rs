//! Lock-aware stake position ledger for the fungible-receipt variant.
//!
//! Positions are appended per user in creation order and never removed; a
//! consumed position is marked `withdrawn` so indices stay stable. Partial
//! withdrawal consumes unlocked positions oldest-first and splits only the
//! last one touched by reducing its amount in place.

use soroban_sdk::{contracttype, Vec};

/// One stake position. The lock is fixed at creation and never retroactively
/// changed by later updates to the global minimum.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePosition {
    pub amount: i128,
    pub stake_time: u64,
    pub unlock_time: u64,
    pub withdrawn: bool,
}

/// Errors raised by the position ledger. Contracts map these into their own
/// error enums.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PositionError {
    InsufficientUnlocked,
    StillLocked,
    AlreadyWithdrawn,
    NotFound,
}

/// Sum of all non-withdrawn position amounts; equals the user's receipt
/// balance by invariant.
pub fn staked_balance(positions: &Vec<StakePosition>) -> i128 {
    let mut total: i128 = 0;
    for p in positions.iter() {
        if !p.withdrawn {
            total = total.saturating_add(p.amount);
        }
    }
    total
}

/// Sum of non-withdrawn positions whose unlock time has passed.
pub fn unlocked_balance(positions: &Vec<StakePosition>, now: u64) -> i128 {
    let mut total: i128 = 0;
    for p in positions.iter() {
        if !p.withdrawn && p.unlock_time <= now {
            total = total.saturating_add(p.amount);
        }
    }
    total
}

/// Sum of non-withdrawn positions that are still locked.
pub fn locked_balance(positions: &Vec<StakePosition>, now: u64) -> i128 {
    let mut total: i128 = 0;
    for p in positions.iter() {
        if !p.withdrawn && p.unlock_time > now {
            total = total.saturating_add(p.amount);
        }
    }
    total
}

/// Consume `amount` across unlocked positions, oldest first.
///
/// Fully consumed positions are marked withdrawn; the final partially
/// consumed one is split by reducing its amount. Fails without touching the
/// ledger when the unlocked balance cannot cover `amount`.
pub fn consume_fifo(
    positions: &mut Vec<StakePosition>,
    amount: i128,
    now: u64,
) -> Result<(), PositionError> {
    if amount > unlocked_balance(positions, now) {
        return Err(PositionError::InsufficientUnlocked);
    }

    let mut remaining = amount;
    for i in 0..positions.len() {
        if remaining == 0 {
            break;
        }
        if let Some(mut p) = positions.get(i) {
            if p.withdrawn || p.unlock_time > now {
                continue;
            }
            if p.amount <= remaining {
                remaining -= p.amount;
                p.withdrawn = true;
            } else {
                p.amount -= remaining;
                remaining = 0;
            }
            positions.set(i, p);
        }
    }
    Ok(())
}

/// Withdraw one exact position by index. Returns the amount released.
pub fn consume_exact(
    positions: &mut Vec<StakePosition>,
    index: u32,
    now: u64,
) -> Result<i128, PositionError> {
    let mut p = positions.get(index).ok_or(PositionError::NotFound)?;
    if p.withdrawn {
        return Err(PositionError::AlreadyWithdrawn);
    }
    if p.unlock_time > now {
        return Err(PositionError::StillLocked);
    }
    p.withdrawn = true;
    let amount = p.amount;
    positions.set(index, p);
    Ok(amount)
}

/// Void every live position regardless of lock state, returning the total
/// principal released. Used by the forced-exit path.
pub fn void_all(positions: &mut Vec<StakePosition>) -> i128 {
    let mut total: i128 = 0;
    for i in 0..positions.len() {
        if let Some(mut p) = positions.get(i) {
            if !p.withdrawn {
                total = total.saturating_add(p.amount);
                p.withdrawn = true;
                positions.set(i, p);
            }
        }
    }
    total
}
