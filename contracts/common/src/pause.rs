//! Supply-zero pause state machine.
//!
//! Tracks whether total staked supply is zero as of the last accrual update
//! and reports the crossings. The caller applies the resulting transition to
//! every schedule of every whitelisted token: a drop to zero stamps
//! `paused_at`, a recovery credits the pause duration back. The accumulator
//! freeze itself happens independently in the accrual layer (which skips
//! accrual whenever supply is zero); the two mechanisms deliberately overlap.

use soroban_sdk::contracttype;

/// Cached view of the supply-zero condition, evaluated at the last update.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupplyPauseState {
    pub was_total_supply_zero: bool,
    pub last_total_supply_zero_time: u64,
}

impl SupplyPauseState {
    /// State for a freshly initialized pool, which starts empty.
    pub fn genesis(now: u64) -> Self {
        Self {
            was_total_supply_zero: true,
            last_total_supply_zero_time: now,
        }
    }
}

/// Outcome of a transition check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    None,
    /// Supply just dropped to zero; stamp `paused_at = now` on live schedules.
    Paused,
    /// Supply just became nonzero; credit `pause_duration` to paused schedules.
    Resumed { pause_duration: u64 },
}

/// Detect a supply-zero crossing against the current total and update the
/// cached state in place.
pub fn transition(state: &mut SupplyPauseState, total_staked: i128, now: u64) -> Transition {
    let is_zero = total_staked <= 0;
    match (state.was_total_supply_zero, is_zero) {
        (false, true) => {
            state.was_total_supply_zero = true;
            state.last_total_supply_zero_time = now;
            Transition::Paused
        }
        (true, false) => {
            state.was_total_supply_zero = false;
            Transition::Resumed {
                pause_duration: now.saturating_sub(state.last_total_supply_zero_time),
            }
        }
        _ => Transition::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_transition_while_supply_stays_nonzero() {
        let mut state = SupplyPauseState {
            was_total_supply_zero: false,
            last_total_supply_zero_time: 0,
        };
        assert_eq!(transition(&mut state, 100, 50), Transition::None);
        assert!(!state.was_total_supply_zero);
    }

    #[test]
    fn drop_to_zero_records_time() {
        let mut state = SupplyPauseState {
            was_total_supply_zero: false,
            last_total_supply_zero_time: 0,
        };
        assert_eq!(transition(&mut state, 0, 300), Transition::Paused);
        assert!(state.was_total_supply_zero);
        assert_eq!(state.last_total_supply_zero_time, 300);
    }

    #[test]
    fn recovery_reports_pause_duration() {
        let mut state = SupplyPauseState::genesis(100);
        assert_eq!(
            transition(&mut state, 1, 250),
            Transition::Resumed {
                pause_duration: 150
            }
        );
        assert!(!state.was_total_supply_zero);
    }

    #[test]
    fn repeated_zero_checks_keep_first_timestamp() {
        let mut state = SupplyPauseState {
            was_total_supply_zero: false,
            last_total_supply_zero_time: 0,
        };
        transition(&mut state, 0, 300);
        assert_eq!(transition(&mut state, 0, 400), Transition::None);
        assert_eq!(state.last_total_supply_zero_time, 300);
    }
}
