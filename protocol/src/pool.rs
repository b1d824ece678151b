//! # Pool Accounting State
//!
//! [`PoolState`] is the two-counter ledger the vault keeps about itself.
//! `tracked_assets` is maintained by the vault's own deposit and withdrawal
//! flows and is never read back from the asset ledger, so assets sent to the
//! vault outside those flows do not move the exchange rate. `total_shares`
//! mirrors the share ledger's supply exactly.
//!
//! The successor constructors are pure: they compute the post-operation state
//! with checked arithmetic and leave `self` alone, so a caller can validate the
//! whole transition before applying any effect.

use serde::{Deserialize, Serialize};

use crate::math::MathError;
use crate::Amount;

/// Accounting counters of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PoolState {
    /// Assets attributable to deposits and mints, net of withdrawals and redemptions.
    pub tracked_assets: Amount,
    /// Total shares issued. Always equal to the share ledger's supply.
    pub total_shares: Amount,
}

impl PoolState {
    /// The genesis state: both counters zero.
    pub const fn empty() -> Self {
        Self {
            tracked_assets: 0,
            total_shares: 0,
        }
    }

    /// Creates a state with explicit counters.
    pub const fn new(tracked_assets: Amount, total_shares: Amount) -> Self {
        Self {
            tracked_assets,
            total_shares,
        }
    }

    /// Returns `true` when neither counter holds anything.
    pub fn is_empty(&self) -> bool {
        self.tracked_assets == 0 && self.total_shares == 0
    }

    /// State after `assets` come in and `shares` are issued.
    ///
    /// # Errors
    ///
    /// [`MathError::Overflow`] if either counter would exceed `Amount::MAX`.
    pub fn after_deposit(&self, assets: Amount, shares: Amount) -> Result<Self, MathError> {
        Ok(Self {
            tracked_assets: self
                .tracked_assets
                .checked_add(assets)
                .ok_or(MathError::Overflow)?,
            total_shares: self
                .total_shares
                .checked_add(shares)
                .ok_or(MathError::Overflow)?,
        })
    }

    /// State after `shares` are burned and `assets` go out.
    ///
    /// # Errors
    ///
    /// [`MathError::Overflow`] if either counter would drop below zero.
    pub fn after_withdrawal(&self, assets: Amount, shares: Amount) -> Result<Self, MathError> {
        Ok(Self {
            tracked_assets: self
                .tracked_assets
                .checked_sub(assets)
                .ok_or(MathError::Overflow)?,
            total_shares: self
                .total_shares
                .checked_sub(shares)
                .ok_or(MathError::Overflow)?,
        })
    }
}
