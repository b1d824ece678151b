//! # Ledger Interfaces
//!
//! The vault does not keep anyone's balances itself. Base-asset balances live
//! in an [`AssetLedger`], share balances in a [`ShareLedger`]; the vault only
//! keeps its own accounting counters and drives the ledgers in a fixed order.
//!
//! ```text
//! mod.rs     — the two collaborator traits and their error type
//! memory.rs  — BTreeMap-backed ledgers for tests and the simulator
//! ```
//!
//! Implementations are treated as untrusted: any call may fail, and the vault
//! is responsible for leaving its own state consistent when one does.

pub mod memory;

use thiserror::Error;

use crate::Amount;

pub use memory::{MemoryAssetLedger, MemoryShareLedger};

/// Account identifier on either ledger.
pub type Address = String;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by a ledger primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The debited account does not hold enough.
    #[error("insufficient balance: {account} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// Its current balance.
        available: Amount,
        /// The amount requested.
        requested: Amount,
    },

    /// The spender's allowance over the owner's balance is too small.
    #[error(
        "insufficient allowance: {spender} may spend {allowance} of {owner}'s balance, requested {requested}"
    )]
    InsufficientAllowance {
        /// The account whose tokens would move.
        owner: Address,
        /// The account trying to move them.
        spender: Address,
        /// The allowance currently granted.
        allowance: Amount,
        /// The amount requested.
        requested: Amount,
    },

    /// A balance or the total supply would exceed `Amount::MAX`.
    #[error("ledger overflow")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The base asset's ledger, as seen by the vault.
pub trait AssetLedger {
    /// Raw balance held by `account`.
    fn balance_of(&self, account: &str) -> Amount;

    /// Moves `amount` from `from` into the vault's account, drawing on the
    /// allowance `from` granted to `vault`.
    fn pull(&mut self, from: &str, vault: &str, amount: Amount) -> Result<(), LedgerError>;

    /// Moves `amount` from the vault's account to `to`.
    fn push(&mut self, vault: &str, to: &str, amount: Amount) -> Result<(), LedgerError>;
}

/// The share token's ledger. The vault is the only minter and burner.
pub trait ShareLedger {
    /// Total shares in existence.
    fn total_supply(&self) -> Amount;

    /// Shares held by `account`.
    fn balance_of(&self, account: &str) -> Amount;

    /// Shares `spender` may move on behalf of `owner`.
    fn allowance(&self, owner: &str, spender: &str) -> Amount;

    /// Sets the allowance `owner` grants to `spender`.
    fn approve(&mut self, owner: &str, spender: &str, amount: Amount) -> Result<(), LedgerError>;

    /// Consumes `amount` of `spender`'s allowance over `owner`.
    /// An allowance of `Amount::MAX` is unlimited and is left untouched.
    fn spend_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Issues `amount` new shares to `to`.
    fn mint(&mut self, to: &str, amount: Amount) -> Result<(), LedgerError>;

    /// Destroys `amount` shares held by `from`.
    fn burn(&mut self, from: &str, amount: Amount) -> Result<(), LedgerError>;
}
