//! Shared reward-accrual engine for the Lockstake contract suite.
//!
//! This crate holds everything the two staking variants (fungible-receipt and
//! NFT-receipt) have in common:
//! - [`accrual`] — fixed-point reward-per-share math.
//! - [`schedule`] — per-token emission schedules and the active-rate scan.
//! - [`pause`] — the supply-zero pause state machine.
//! - [`rewards`] — the storage-level engine tying the three together; the
//!   staking contracts only feed it stake balances.
//! - [`position`] — the lock-aware position ledger used by the fungible
//!   variant.
//! - [`roles`], [`compliance`], [`reentrancy`] — role tiers, blacklist/freeze
//!   flags, and the payout reentrancy guard.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod accrual;
pub mod compliance;
pub mod pause;
pub mod position;
pub mod reentrancy;
pub mod rewards;
pub mod roles;
pub mod schedule;
