//! # Shared Vault Handle
//!
//! A [`Vault`] mutates through `&mut self`. To drive one vault from several
//! threads, wrap it in a [`SharedVault`]: every operation takes the lock for
//! its whole duration, so two calls never interleave and each observes the
//! state the previous one committed.

use std::sync::Arc;

use parking_lot::Mutex;

use sats_protocol::ledger::{AssetLedger, ShareLedger};
use sats_protocol::Amount;

use crate::error::VaultError;
use crate::vault::{Vault, VaultSnapshot};

/// Cloneable, thread-safe handle to one vault.
#[derive(Debug)]
pub struct SharedVault<A, S> {
    inner: Arc<Mutex<Vault<A, S>>>,
}

impl<A, S> Clone for SharedVault<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AssetLedger, S: ShareLedger> SharedVault<A, S> {
    /// Takes ownership of `vault`.
    pub fn new(vault: Vault<A, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    /// Locks and calls [`Vault::deposit`].
    pub fn deposit(&self, caller: &str, assets: Amount, receiver: &str) -> Result<Amount, VaultError> {
        self.inner.lock().deposit(caller, assets, receiver)
    }

    /// Locks and calls [`Vault::mint`].
    pub fn mint(&self, caller: &str, shares: Amount, receiver: &str) -> Result<Amount, VaultError> {
        self.inner.lock().mint(caller, shares, receiver)
    }

    /// Locks and calls [`Vault::withdraw`].
    pub fn withdraw(
        &self,
        caller: &str,
        assets: Amount,
        receiver: &str,
        owner: &str,
    ) -> Result<Amount, VaultError> {
        self.inner.lock().withdraw(caller, assets, receiver, owner)
    }

    /// Locks and calls [`Vault::redeem`].
    pub fn redeem(
        &self,
        caller: &str,
        shares: Amount,
        receiver: &str,
        owner: &str,
    ) -> Result<Amount, VaultError> {
        self.inner.lock().redeem(caller, shares, receiver, owner)
    }

    /// Locks and calls [`Vault::approve_shares`].
    pub fn approve_shares(&self, owner: &str, spender: &str, amount: Amount) -> Result<(), VaultError> {
        self.inner.lock().approve_shares(owner, spender, amount)
    }

    /// Runs `f` against the vault under the lock. For views, or for
    /// several calls that must observe one consistent state.
    pub fn read<R>(&self, f: impl FnOnce(&Vault<A, S>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` with exclusive access, e.g. to fund accounts on the asset ledger.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Vault<A, S>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// A consistent snapshot of the counters and metadata.
    pub fn snapshot(&self) -> Result<VaultSnapshot, VaultError> {
        self.inner.lock().snapshot()
    }
}
