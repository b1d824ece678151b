//! # Conversion Engine
//!
//! Converts between asset subunits and share subunits against a pool's
//! accounting state:
//!
//! ```text
//! shares = assets × (total_shares + 10^offset) / (tracked_assets + 1)
//! assets = shares × (tracked_assets + 1) / (total_shares + 10^offset)
//! ```
//!
//! The `+1` and `+10^offset` terms are virtual liquidity. On an empty pool
//! they pin the rate to exactly `10^offset` share subunits per asset subunit.
//! On a near-empty pool they make the rate expensive to distort: a donor who
//! inflates the pool's assets mostly dilutes the virtual shares, so the
//! donation is lost to the vault rather than captured from the next depositor.

use super::mul_div::mul_div;
use super::rounding::Rounding;
use super::MathError;
use crate::pool::PoolState;
use crate::Amount;

/// Returns `10^exponent`, or [`MathError::Overflow`] if it does not fit.
pub fn pow10(exponent: u32) -> Result<Amount, MathError> {
    10u128.checked_pow(exponent).ok_or(MathError::Overflow)
}

/// Stateless asset/share converter for a fixed decimals offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionEngine {
    decimals_offset: u8,
    virtual_shares: Amount,
}

impl ConversionEngine {
    /// Creates an engine for the given decimals offset.
    ///
    /// # Errors
    ///
    /// [`MathError::Overflow`] if `10^decimals_offset` does not fit in an [`Amount`].
    pub fn new(decimals_offset: u8) -> Result<Self, MathError> {
        Ok(Self {
            decimals_offset,
            virtual_shares: pow10(u32::from(decimals_offset))?,
        })
    }

    /// The offset this engine was built with.
    pub fn decimals_offset(&self) -> u8 {
        self.decimals_offset
    }

    /// `10^decimals_offset`, the virtual share term.
    pub fn virtual_shares(&self) -> Amount {
        self.virtual_shares
    }

    /// Shares worth `assets` at the state's current rate.
    pub fn convert_to_shares(
        &self,
        assets: Amount,
        state: &PoolState,
        rounding: Rounding,
    ) -> Result<Amount, MathError> {
        let (virtual_assets, virtual_shares) = self.virtual_totals(state)?;
        mul_div(assets, virtual_shares, virtual_assets, rounding)
    }

    /// Assets worth `shares` at the state's current rate.
    pub fn convert_to_assets(
        &self,
        shares: Amount,
        state: &PoolState,
        rounding: Rounding,
    ) -> Result<Amount, MathError> {
        let (virtual_assets, virtual_shares) = self.virtual_totals(state)?;
        mul_div(shares, virtual_assets, virtual_shares, rounding)
    }

    fn virtual_totals(&self, state: &PoolState) -> Result<(Amount, Amount), MathError> {
        let virtual_assets = state
            .tracked_assets
            .checked_add(1)
            .ok_or(MathError::Overflow)?;
        let virtual_shares = state
            .total_shares
            .checked_add(self.virtual_shares)
            .ok_or(MathError::Overflow)?;
        Ok((virtual_assets, virtual_shares))
    }
}
