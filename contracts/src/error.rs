//! # Vault Errors
//!
//! Every failed vault call returns exactly one of these and leaves the vault,
//! its ledgers and every allowance as they were before the call.

use sats_protocol::ledger::{Address, LedgerError};
use sats_protocol::{Amount, ConfigError, MathError};
use thiserror::Error;

/// Errors returned by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A deposit or withdrawal of zero assets, or a redemption whose assets
    /// round down to zero.
    #[error("zero assets")]
    ZeroAssets,

    /// A mint or redemption of zero shares, or a deposit whose shares round
    /// down to zero.
    #[error("zero shares")]
    ZeroShares,

    /// The owner's position cannot cover the request.
    #[error("insufficient balance: {owner} can cover {available}, requested {requested}")]
    InsufficientBalance {
        /// The share owner.
        owner: Address,
        /// What the owner's position covers, in the request's unit.
        available: Amount,
        /// What was requested.
        requested: Amount,
    },

    /// The caller acts for an owner without enough share allowance.
    #[error(
        "insufficient authorization: {spender} may move {allowance} of {owner}'s shares, {required} required"
    )]
    InsufficientAuthorization {
        /// The share owner.
        owner: Address,
        /// The caller acting on the owner's behalf.
        spender: Address,
        /// The allowance currently granted.
        allowance: Amount,
        /// The shares the operation would burn.
        required: Amount,
    },

    /// The vault's own account tried to fund an entry. Its assets are already
    /// tracked, so pulling them again would count them twice.
    #[error("vault {vault} cannot deposit into itself")]
    SelfEntry {
        /// The vault's account address.
        vault: Address,
    },

    /// Arithmetic exceeded the representable range.
    #[error("arithmetic overflow")]
    Overflow,

    /// An asset or share ledger call failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The vault could not be constructed from its configuration.
    #[error("invalid vault config: {0}")]
    Config(#[from] ConfigError),

    /// A vault must start from a share ledger with no supply, otherwise its
    /// share counter could not mirror the ledger.
    #[error("share ledger already has {supply} shares issued")]
    NonEmptyShareLedger {
        /// The pre-existing supply.
        supply: Amount,
    },
}

impl From<MathError> for VaultError {
    fn from(_: MathError) -> Self {
        // Division by zero cannot happen with virtual liquidity in the
        // denominator; both variants mean the numbers got too big.
        VaultError::Overflow
    }
}

impl VaultError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::ZeroAssets => "zero_assets",
            VaultError::ZeroShares => "zero_shares",
            VaultError::InsufficientBalance { .. } => "insufficient_balance",
            VaultError::InsufficientAuthorization { .. } => "insufficient_authorization",
            VaultError::SelfEntry { .. } => "self_entry",
            VaultError::Overflow => "overflow",
            VaultError::Ledger(_) => "ledger",
            VaultError::Config(_) => "config",
            VaultError::NonEmptyShareLedger { .. } => "non_empty_share_ledger",
        }
    }
}
