//! Per-token reward emission schedules.
//!
//! A schedule is a fixed-rate emission window. Schedules are append-only:
//! once a window's `end_time` passes the schedule stays in the list and simply
//! contributes nothing to the active rate. The pause bookkeeping
//! (`paused_at` / `total_paused_time`) is written by the supply-zero pause
//! controller but is never read back into the rate scan: a pause freezes the
//! accumulator, it does not stretch the window.

use soroban_sdk::{contracttype, Vec};

/// One fixed-rate emission window for a reward token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardSchedule {
    /// Reward units emitted per second, floor-divided from
    /// `total_supplied / duration` at creation. The truncation is permanent.
    pub rate: i128,
    pub start_time: u64,
    pub end_time: u64,
    /// Total reward supplied for this window.
    pub total_supplied: i128,
    /// Timestamp the current pause began, 0 when not paused.
    pub paused_at: u64,
    /// Cumulative seconds this schedule has spent paused. Audit state only.
    pub total_paused_time: u64,
}

/// Build a schedule emitting `total_supplied` over `[start, start + duration)`.
///
/// Callers validate `total_supplied > 0` and `duration > 0` before calling.
pub fn build(total_supplied: i128, start_time: u64, duration: u64) -> RewardSchedule {
    RewardSchedule {
        rate: total_supplied / duration as i128,
        start_time,
        end_time: start_time.saturating_add(duration),
        total_supplied,
        paused_at: 0,
        total_paused_time: 0,
    }
}

/// Sum of the rates of every schedule whose window contains `now`.
///
/// The scan uses the literal stored bounds; `paused_at` and
/// `total_paused_time` are ignored.
pub fn active_rate(schedules: &Vec<RewardSchedule>, now: u64) -> i128 {
    let mut rate: i128 = 0;
    for schedule in schedules.iter() {
        if schedule.start_time <= now && now < schedule.end_time {
            rate = rate.saturating_add(schedule.rate);
        }
    }
    rate
}

/// Reward units emitted by all schedules over the interval `[from, to]`.
///
/// Each schedule contributes `rate` times its window's overlap with the
/// interval. Truncation happened once at rate creation; the per-interval
/// products are exact, so a full window emits `rate * duration` no matter how
/// the updates are spaced.
pub fn emitted_in(schedules: &Vec<RewardSchedule>, from: u64, to: u64) -> i128 {
    let mut emitted: i128 = 0;
    for schedule in schedules.iter() {
        let start = schedule.start_time.max(from);
        let end = schedule.end_time.min(to);
        if start < end {
            emitted = emitted.saturating_add(schedule.rate.saturating_mul((end - start) as i128));
        }
    }
    emitted
}

/// Stamp `paused_at = now` on every unpaused schedule whose window contains
/// `now`. Called when total staked supply drops to zero.
pub fn pause_active(schedules: &mut Vec<RewardSchedule>, now: u64) {
    for i in 0..schedules.len() {
        if let Some(mut schedule) = schedules.get(i) {
            if schedule.paused_at == 0 && schedule.start_time <= now && now < schedule.end_time {
                schedule.paused_at = now;
                schedules.set(i, schedule);
            }
        }
    }
}

/// Credit `pause_duration` to every paused schedule and clear its pause mark.
/// Called when total staked supply becomes nonzero again.
pub fn resume_paused(schedules: &mut Vec<RewardSchedule>, pause_duration: u64) {
    for i in 0..schedules.len() {
        if let Some(mut schedule) = schedules.get(i) {
            if schedule.paused_at > 0 {
                schedule.total_paused_time =
                    schedule.total_paused_time.saturating_add(pause_duration);
                schedule.paused_at = 0;
                schedules.set(i, schedule);
            }
        }
    }
}
