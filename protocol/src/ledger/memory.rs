//! # In-Memory Ledgers
//!
//! Map-backed implementations of [`AssetLedger`] and [`ShareLedger`]. They
//! behave like a plain fungible token: balances, allowances and a total
//! supply, with every credit overflow-checked and every debit bounded by the
//! balance. Tests and the simulator use them; production deployments plug in
//! whatever ledger actually holds the tokens.
//!
//! Both ledgers share a [`TokenBook`] for the bookkeeping and differ only in
//! which primitives they expose to the vault.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Address, AssetLedger, LedgerError, ShareLedger};
use crate::Amount;

// ---------------------------------------------------------------------------
// TokenBook
// ---------------------------------------------------------------------------

/// Balances, allowances and supply of a single fungible token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct TokenBook {
    balances: BTreeMap<Address, Amount>,
    /// `owner -> (spender -> allowance)`.
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    total_supply: Amount,
}

impl TokenBook {
    fn balance_of(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|granted| granted.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &str, spender: &str, amount: Amount) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    fn spend_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, spender);
        if allowance == Amount::MAX {
            return Ok(());
        }
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                allowance,
                requested: amount,
            });
        }
        self.approve(owner, spender, allowance - amount);
        Ok(())
    }

    fn credit(&mut self, account: &str, amount: Amount) -> Result<(), LedgerError> {
        let current = self.balance_of(account);
        let updated = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.balances.insert(account.to_string(), updated);
        Ok(())
    }

    fn debit(&mut self, account: &str, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.to_string(),
                available,
                requested: amount,
            });
        }
        self.balances.insert(account.to_string(), available - amount);
        Ok(())
    }

    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(), LedgerError> {
        // Check the credit side first so a failed transfer changes nothing.
        if from != to {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn mint(&mut self, to: &str, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    fn burn(&mut self, from: &str, amount: Amount) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        // Every unit held was minted, so the supply cannot underflow here.
        self.total_supply -= amount;
        Ok(())
    }

    fn holders(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(account, amount)| (account.as_str(), *amount))
    }
}

// ---------------------------------------------------------------------------
// MemoryAssetLedger
// ---------------------------------------------------------------------------

/// A base-asset ledger held in memory.
///
/// Beyond the [`AssetLedger`] primitives it offers the ordinary token surface
/// a test or simulation needs: faucet minting, approvals, and direct
/// transfers (which is how a donation into the vault is modelled).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAssetLedger {
    book: TokenBook,
}

impl MemoryAssetLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` new units for `to`.
    pub fn mint(&mut self, to: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.mint(to, amount)
    }

    /// Lets `spender` pull up to `amount` from `owner`.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: Amount) {
        self.book.approve(owner, spender, amount);
    }

    /// Current allowance `owner` granted to `spender`.
    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.book.allowance(owner, spender)
    }

    /// Moves `amount` from `from` to `to` without any allowance.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.transfer(from, to, amount)
    }

    /// Total units in existence.
    pub fn total_supply(&self) -> Amount {
        self.book.total_supply
    }

    /// Accounts with a non-zero balance, in address order.
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.book
            .holders()
            .map(|(account, amount)| (account.to_string(), amount))
            .collect()
    }
}

impl AssetLedger for MemoryAssetLedger {
    fn balance_of(&self, account: &str) -> Amount {
        self.book.balance_of(account)
    }

    fn pull(&mut self, from: &str, vault: &str, amount: Amount) -> Result<(), LedgerError> {
        // Validate the transfer before consuming the allowance.
        let available = self.book.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                available,
                requested: amount,
            });
        }
        let allowance = self.book.allowance(from, vault);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.to_string(),
                spender: vault.to_string(),
                allowance,
                requested: amount,
            });
        }
        self.book.transfer(from, vault, amount)?;
        self.book.spend_allowance(from, vault, amount)
    }

    fn push(&mut self, vault: &str, to: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.transfer(vault, to, amount)
    }
}

// ---------------------------------------------------------------------------
// MemoryShareLedger
// ---------------------------------------------------------------------------

/// A share-token ledger held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryShareLedger {
    book: TokenBook,
}

impl MemoryShareLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts with a non-zero share balance, in address order.
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.book
            .holders()
            .map(|(account, amount)| (account.to_string(), amount))
            .collect()
    }
}

impl ShareLedger for MemoryShareLedger {
    fn total_supply(&self) -> Amount {
        self.book.total_supply
    }

    fn balance_of(&self, account: &str) -> Amount {
        self.book.balance_of(account)
    }

    fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.book.allowance(owner, spender)
    }

    fn approve(&mut self, owner: &str, spender: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.approve(owner, spender, amount);
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.book.spend_allowance(owner, spender, amount)
    }

    fn mint(&mut self, to: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.mint(to, amount)
    }

    fn burn(&mut self, from: &str, amount: Amount) -> Result<(), LedgerError> {
        self.book.burn(from, amount)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
