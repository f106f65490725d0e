//! Fixed-point reward-per-share accounting.
//!
//! The global accumulator tracks cumulative reward earned per unit of stake
//! since genesis, scaled by [`SCALE`]. Each user carries a checkpoint of the
//! accumulator taken at their last update plus a banked (computed but
//! unclaimed) reward amount. All division floors; sub-`1/SCALE` dust is
//! dropped at each update rather than carried forward.

use soroban_sdk::contracttype;

/// Fixed-point scaling factor for the reward-per-share accumulator (1e18).
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Per-token global accrual state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAccrual {
    /// Timestamp of the last accumulator flush. Advances on every update,
    /// including updates taken while total supply is zero.
    pub last_update_time: u64,
    /// Monotonically non-decreasing reward-per-share integral, scaled by
    /// [`SCALE`].
    pub reward_per_share_stored: i128,
}

/// Per-user, per-token checkpoint state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserAccrual {
    /// Value of the global accumulator at the user's last settlement.
    pub reward_per_share_paid: i128,
    /// Reward computed and stored at the last settlement, pending claim.
    pub banked: i128,
}

impl UserAccrual {
    pub fn zero() -> Self {
        Self {
            reward_per_share_paid: 0,
            banked: 0,
        }
    }
}

/// Reward-per-share value after distributing `emitted` reward units across
/// `total_staked`.
///
/// While `total_staked` is zero the accumulator is frozen: nobody is staked,
/// so no reward accrues and `stored` is returned unchanged.
pub fn reward_per_share(stored: i128, emitted: i128, total_staked: i128) -> i128 {
    if total_staked <= 0 {
        return stored;
    }
    stored.saturating_add(emitted.saturating_mul(SCALE) / total_staked)
}

/// Total reward a user could claim right now: the delta against their
/// checkpoint plus whatever is already banked. Floors toward zero.
pub fn earned(staked: i128, current_rps: i128, rps_paid: i128, banked: i128) -> i128 {
    let delta = current_rps.saturating_sub(rps_paid);
    banked.saturating_add(staked.saturating_mul(delta) / SCALE)
}

/// Flush the pool accumulator to `now`, distributing `emitted` reward units
/// (the schedules' output over `[last_update_time, now]`).
///
/// The accumulator only grows while `total_staked > 0`, but
/// `last_update_time` advances unconditionally, so a zero-supply stretch is
/// spent without accruing.
pub fn flush_pool(pool: &mut PoolAccrual, emitted: i128, total_staked: i128, now: u64) {
    pool.reward_per_share_stored =
        reward_per_share(pool.reward_per_share_stored, emitted, total_staked);
    pool.last_update_time = now;
}

/// Flush the pool to `now` and settle `user` against it: bank the delta and
/// move the checkpoint up to the stored accumulator.
pub fn settle(
    pool: &mut PoolAccrual,
    user: &mut UserAccrual,
    user_staked: i128,
    total_staked: i128,
    emitted: i128,
    now: u64,
) {
    flush_pool(pool, emitted, total_staked, now);
    user.banked = earned(
        user_staked,
        pool.reward_per_share_stored,
        user.reward_per_share_paid,
        user.banked,
    );
    user.reward_per_share_paid = pool.reward_per_share_stored;
}
