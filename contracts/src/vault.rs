//! # Tokenized Vault
//!
//! Holders deposit the base asset and receive shares; shares are redeemed for
//! a proportional slice of the vault's tracked assets. The exchange rate comes
//! from the [`ConversionEngine`] applied to the vault's own [`PoolState`]. It
//! never comes from the raw balance the asset ledger reports for the vault, so
//! assets sent outside `deposit`/`mint` change nothing but that raw balance.
//!
//! ## Rounding
//!
//! Every conversion rounds in the vault's favor:
//!
//! | Operation  | Caller fixes | Vault computes | Rounding |
//! |------------|--------------|----------------|----------|
//! | `deposit`  | assets in    | shares out     | floor    |
//! | `mint`     | shares out   | assets in      | ceiling  |
//! | `withdraw` | assets out   | shares in      | ceiling  |
//! | `redeem`   | shares in    | assets out     | floor    |
//!
//! ## Effect Ordering
//!
//! Guards run against the state observed before the call, and the successor
//! state is computed (with checked arithmetic) before the first effect.
//! Entering pulls assets before minting shares; exiting burns shares before
//! pushing assets, and each counter is committed right after the ledger call
//! it mirrors. If any ledger call fails part-way, the effects already applied
//! are unwound in reverse order and the pre-call state is restored, so a
//! failed call changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sats_protocol::ledger::{Address, AssetLedger, ShareLedger};
use sats_protocol::math::conversion::pow10;
use sats_protocol::{Amount, ConversionEngine, PoolState, Rounding, VaultConfig};

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time, serializable view of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// The vault's account on the asset ledger.
    pub address: Address,
    /// Share-token name.
    pub name: String,
    /// Share-token ticker.
    pub symbol: String,
    /// Share-token decimals.
    pub decimals: u8,
    /// Virtual offset exponent.
    pub decimals_offset: u8,
    /// Accounting counters.
    pub state: PoolState,
    /// What the asset ledger says the vault holds. At least `state.tracked_assets`.
    pub raw_asset_balance: Amount,
    /// Share ledger supply. Equal to `state.total_shares`.
    pub share_supply: Amount,
    /// Assets per whole share, floored.
    pub price_per_share: Amount,
    /// When the vault was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Unwind journal
// ---------------------------------------------------------------------------

/// A ledger effect to reverse when a later step of the same call fails.
#[derive(Debug)]
enum Undo {
    /// Return pulled assets to the payer.
    RefundAssets { to: Address, amount: Amount },
    /// Re-issue burned shares to their owner.
    RemintShares { to: Address, amount: Amount },
    /// Put a spent allowance back to its previous value.
    RestoreAllowance {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A single-asset vault over an asset ledger `A` and its own share ledger `S`.
///
/// The vault exclusively owns its [`PoolState`]. Every mutating operation
/// takes `&mut self`, so operations on one vault are serialized by
/// construction and a ledger cannot re-enter the vault while a call is in
/// flight. Use [`SharedVault`](crate::shared::SharedVault) to share one vault
/// across threads.
#[derive(Debug)]
pub struct Vault<A, S> {
    address: Address,
    config: VaultConfig,
    engine: ConversionEngine,
    state: PoolState,
    assets: A,
    shares: S,
    created_at: DateTime<Utc>,
}

impl<A: AssetLedger, S: ShareLedger> Vault<A, S> {
    /// Creates a vault with a freshly generated account address.
    ///
    /// # Errors
    ///
    /// [`VaultError::Config`] if the config does not validate, and
    /// [`VaultError::NonEmptyShareLedger`] if `shares` already has a supply.
    pub fn new(config: VaultConfig, assets: A, shares: S) -> Result<Self, VaultError> {
        let address = format!("vault:{}", Uuid::new_v4());
        Self::with_address(config, address, assets, shares)
    }

    /// Creates a vault whose asset-ledger account is `address`.
    pub fn with_address(
        config: VaultConfig,
        address: impl Into<Address>,
        assets: A,
        shares: S,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        let engine = ConversionEngine::new(config.decimals_offset)?;

        let supply = shares.total_supply();
        if supply != 0 {
            return Err(VaultError::NonEmptyShareLedger { supply });
        }

        let vault = Self {
            address: address.into(),
            config,
            engine,
            state: PoolState::empty(),
            assets,
            shares,
            created_at: Utc::now(),
        };

        tracing::info!(
            vault = %vault.address,
            symbol = %vault.config.symbol,
            decimals_offset = vault.config.decimals_offset,
            "vault created"
        );
        Ok(vault)
    }

    // -----------------------------------------------------------------------
    // Entry
    // -----------------------------------------------------------------------

    /// Deposits exactly `assets` from `caller` and mints the corresponding
    /// shares (rounded down) to `receiver`. Returns the shares minted.
    ///
    /// # Errors
    ///
    /// - [`VaultError::SelfEntry`] if `caller` is the vault itself.
    /// - [`VaultError::ZeroAssets`] if `assets` is zero.
    /// - [`VaultError::ZeroShares`] if the deposit is worth less than one share subunit.
    /// - [`VaultError::Ledger`] if the caller cannot pay.
    pub fn deposit(
        &mut self,
        caller: &str,
        assets: Amount,
        receiver: &str,
    ) -> Result<Amount, VaultError> {
        self.check_external_payer("deposit", caller)?;
        if assets == 0 {
            return Err(self.reject("deposit", caller, VaultError::ZeroAssets));
        }
        let shares = self.preview_deposit(assets)?;
        if shares == 0 {
            return Err(self.reject("deposit", caller, VaultError::ZeroShares));
        }

        self.enter(caller, assets, shares, receiver)?;
        tracing::debug!(
            vault = %self.address,
            caller,
            receiver,
            assets = %assets,
            shares = %shares,
            "deposit"
        );
        Ok(shares)
    }

    /// Mints exactly `shares` to `receiver`, pulling the corresponding assets
    /// (rounded up) from `caller`. Returns the assets paid.
    ///
    /// # Errors
    ///
    /// - [`VaultError::SelfEntry`] if `caller` is the vault itself.
    /// - [`VaultError::ZeroShares`] if `shares` is zero.
    /// - [`VaultError::Ledger`] if the caller cannot pay.
    pub fn mint(
        &mut self,
        caller: &str,
        shares: Amount,
        receiver: &str,
    ) -> Result<Amount, VaultError> {
        self.check_external_payer("mint", caller)?;
        if shares == 0 {
            return Err(self.reject("mint", caller, VaultError::ZeroShares));
        }
        // Ceiling of a positive numerator over a positive denominator is at
        // least one, so a mint always costs something.
        let assets = self.preview_mint(shares)?;

        self.enter(caller, assets, shares, receiver)?;
        tracing::debug!(
            vault = %self.address,
            caller,
            receiver,
            assets = %assets,
            shares = %shares,
            "mint"
        );
        Ok(assets)
    }

    // -----------------------------------------------------------------------
    // Exit
    // -----------------------------------------------------------------------

    /// Sends exactly `assets` to `receiver`, burning the corresponding shares
    /// (rounded up) from `owner`. Returns the shares burned.
    ///
    /// When `caller` is not `owner`, the burn is charged against the
    /// allowance `owner` granted `caller` on the share token.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAssets`] if `assets` is zero.
    /// - [`VaultError::InsufficientBalance`] if `assets` exceeds [`max_withdraw`](Self::max_withdraw).
    /// - [`VaultError::InsufficientAuthorization`] if `caller` lacks allowance.
    pub fn withdraw(
        &mut self,
        caller: &str,
        assets: Amount,
        receiver: &str,
        owner: &str,
    ) -> Result<Amount, VaultError> {
        if assets == 0 {
            return Err(self.reject("withdraw", caller, VaultError::ZeroAssets));
        }
        let available = self.max_withdraw(owner)?;
        if assets > available {
            return Err(self.reject(
                "withdraw",
                caller,
                VaultError::InsufficientBalance {
                    owner: owner.to_string(),
                    available,
                    requested: assets,
                },
            ));
        }
        let shares = self.preview_withdraw(assets)?;
        self.check_share_balance("withdraw", caller, owner, shares)?;
        self.check_authorization("withdraw", caller, owner, shares)?;

        self.exit(caller, assets, shares, receiver, owner)?;
        tracing::debug!(
            vault = %self.address,
            caller,
            receiver,
            owner,
            assets = %assets,
            shares = %shares,
            "withdraw"
        );
        Ok(shares)
    }

    /// Burns exactly `shares` from `owner` and sends the corresponding assets
    /// (rounded down) to `receiver`. Returns the assets sent.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroShares`] if `shares` is zero.
    /// - [`VaultError::InsufficientBalance`] if `owner` holds fewer than `shares`.
    /// - [`VaultError::InsufficientAuthorization`] if `caller` lacks allowance.
    /// - [`VaultError::ZeroAssets`] if the shares are worth less than one asset subunit.
    pub fn redeem(
        &mut self,
        caller: &str,
        shares: Amount,
        receiver: &str,
        owner: &str,
    ) -> Result<Amount, VaultError> {
        if shares == 0 {
            return Err(self.reject("redeem", caller, VaultError::ZeroShares));
        }
        self.check_share_balance("redeem", caller, owner, shares)?;
        self.check_authorization("redeem", caller, owner, shares)?;
        let assets = self.preview_redeem(shares)?;
        if assets == 0 {
            return Err(self.reject("redeem", caller, VaultError::ZeroAssets));
        }

        self.exit(caller, assets, shares, receiver, owner)?;
        tracing::debug!(
            vault = %self.address,
            caller,
            receiver,
            owner,
            assets = %assets,
            shares = %shares,
            "redeem"
        );
        Ok(assets)
    }

    // -----------------------------------------------------------------------
    // Previews & conversions
    // -----------------------------------------------------------------------

    /// Shares [`deposit`](Self::deposit) would mint for `assets` right now.
    pub fn preview_deposit(&self, assets: Amount) -> Result<Amount, VaultError> {
        Ok(self
            .engine
            .convert_to_shares(assets, &self.state, Rounding::Floor)?)
    }

    /// Assets [`mint`](Self::mint) would charge for `shares` right now.
    pub fn preview_mint(&self, shares: Amount) -> Result<Amount, VaultError> {
        Ok(self
            .engine
            .convert_to_assets(shares, &self.state, Rounding::Ceiling)?)
    }

    /// Shares [`withdraw`](Self::withdraw) would burn for `assets` right now.
    pub fn preview_withdraw(&self, assets: Amount) -> Result<Amount, VaultError> {
        Ok(self
            .engine
            .convert_to_shares(assets, &self.state, Rounding::Ceiling)?)
    }

    /// Assets [`redeem`](Self::redeem) would pay for `shares` right now.
    pub fn preview_redeem(&self, shares: Amount) -> Result<Amount, VaultError> {
        Ok(self
            .engine
            .convert_to_assets(shares, &self.state, Rounding::Floor)?)
    }

    /// Shares worth `assets` at the current rate, rounded down.
    pub fn convert_to_shares(&self, assets: Amount) -> Result<Amount, VaultError> {
        self.preview_deposit(assets)
    }

    /// Assets worth `shares` at the current rate, rounded down.
    pub fn convert_to_assets(&self, shares: Amount) -> Result<Amount, VaultError> {
        self.preview_redeem(shares)
    }

    /// Asset subunits one whole share (`10^decimals` subunits) is worth,
    /// rounded down. Informational; nothing inside the vault uses it.
    pub fn price_per_share(&self) -> Result<Amount, VaultError> {
        let one_share = pow10(u32::from(self.decimals()))?;
        self.convert_to_assets(one_share)
    }

    // -----------------------------------------------------------------------
    // Limits
    // -----------------------------------------------------------------------

    /// Deposits are unlimited.
    pub fn max_deposit(&self, _receiver: &str) -> Amount {
        Amount::MAX
    }

    /// Mints are unlimited.
    pub fn max_mint(&self, _receiver: &str) -> Amount {
        Amount::MAX
    }

    /// Assets `owner` could withdraw: their shares' value, rounded down.
    pub fn max_withdraw(&self, owner: &str) -> Result<Amount, VaultError> {
        self.convert_to_assets(self.shares.balance_of(owner))
    }

    /// Shares `owner` could redeem: all of them.
    pub fn max_redeem(&self, owner: &str) -> Amount {
        self.shares.balance_of(owner)
    }

    // -----------------------------------------------------------------------
    // Accounting views
    // -----------------------------------------------------------------------

    /// Assets attributable to deposits and mints, net of exits. Deliberately
    /// not the raw ledger balance.
    pub fn total_assets(&self) -> Amount {
        self.state.tracked_assets
    }

    /// Shares issued. Mirrors the share ledger's supply.
    pub fn total_shares(&self) -> Amount {
        self.state.total_shares
    }

    /// What the asset ledger reports for the vault's account, donations included.
    pub fn raw_asset_balance(&self) -> Amount {
        self.assets.balance_of(&self.address)
    }

    /// Current accounting counters.
    pub fn pool_state(&self) -> PoolState {
        self.state
    }

    /// `true` when the share counter equals the share supply and the asset
    /// ledger holds at least the tracked assets.
    pub fn invariants_hold(&self) -> bool {
        self.state.total_shares == self.shares.total_supply()
            && self.raw_asset_balance() >= self.state.tracked_assets
    }

    /// Serializable view of the vault.
    pub fn snapshot(&self) -> Result<VaultSnapshot, VaultError> {
        Ok(VaultSnapshot {
            address: self.address.clone(),
            name: self.config.name.clone(),
            symbol: self.config.symbol.clone(),
            decimals: self.decimals(),
            decimals_offset: self.config.decimals_offset,
            state: self.state,
            raw_asset_balance: self.raw_asset_balance(),
            share_supply: self.shares.total_supply(),
            price_per_share: self.price_per_share()?,
            created_at: self.created_at,
        })
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// The vault's account on the asset ledger.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Construction parameters.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Share-token name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Share-token ticker.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Share-token decimals.
    pub fn decimals(&self) -> u8 {
        self.config.share_decimals()
    }

    /// Virtual offset exponent.
    pub fn decimals_offset(&self) -> u8 {
        self.engine.decimals_offset()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -----------------------------------------------------------------------
    // Share token surface
    // -----------------------------------------------------------------------

    /// Shares held by `account`.
    pub fn share_balance_of(&self, account: &str) -> Amount {
        self.shares.balance_of(account)
    }

    /// Shares `spender` may withdraw or redeem on `owner`'s behalf.
    pub fn share_allowance(&self, owner: &str, spender: &str) -> Amount {
        self.shares.allowance(owner, spender)
    }

    /// Lets `spender` burn up to `amount` of `owner`'s shares through
    /// `withdraw`/`redeem`. `Amount::MAX` never decreases.
    pub fn approve_shares(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Amount,
    ) -> Result<(), VaultError> {
        self.shares.approve(owner, spender, amount)?;
        tracing::debug!(vault = %self.address, owner, spender, amount = %amount, "shares approved");
        Ok(())
    }

    /// The share ledger, read-only. Minting and burning go through the vault.
    pub fn share_ledger(&self) -> &S {
        &self.shares
    }

    /// The asset ledger.
    pub fn asset_ledger(&self) -> &A {
        &self.assets
    }

    /// The asset ledger, mutably. The asset token is external to the vault:
    /// anyone can fund accounts, approve, or transfer into the vault directly.
    /// None of it moves the vault's accounting.
    pub fn asset_ledger_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// A pull from the vault's own account moves nothing, yet the tracked
    /// counter would still grow.
    fn check_external_payer(&self, op: &'static str, caller: &str) -> Result<(), VaultError> {
        if caller == self.address {
            return Err(self.reject(
                op,
                caller,
                VaultError::SelfEntry {
                    vault: self.address.clone(),
                },
            ));
        }
        Ok(())
    }

    /// Pull → tracked += assets → mint → total_shares += shares.
    fn enter(
        &mut self,
        caller: &str,
        assets: Amount,
        shares: Amount,
        receiver: &str,
    ) -> Result<(), VaultError> {
        let before = self.state;
        let after = before.after_deposit(assets, shares)?;

        // Nothing has changed yet if the pull fails.
        self.assets.pull(caller, &self.address, assets)?;
        self.state.tracked_assets = after.tracked_assets;

        if let Err(err) = self.shares.mint(receiver, shares) {
            self.unwind(
                before,
                vec![Undo::RefundAssets {
                    to: caller.to_string(),
                    amount: assets,
                }],
            );
            return Err(err.into());
        }
        self.state.total_shares = after.total_shares;
        Ok(())
    }

    /// Burn → total_shares -= shares → spend allowance → push → tracked -= assets.
    fn exit(
        &mut self,
        caller: &str,
        assets: Amount,
        shares: Amount,
        receiver: &str,
        owner: &str,
    ) -> Result<(), VaultError> {
        let before = self.state;
        let after = before.after_withdrawal(assets, shares)?;

        self.shares.burn(owner, shares)?;
        self.state.total_shares = after.total_shares;
        let mut applied = vec![Undo::RemintShares {
            to: owner.to_string(),
            amount: shares,
        }];

        if caller != owner {
            let allowance = self.shares.allowance(owner, caller);
            if let Err(err) = self.shares.spend_allowance(owner, caller, shares) {
                self.unwind(before, applied);
                return Err(err.into());
            }
            applied.push(Undo::RestoreAllowance {
                owner: owner.to_string(),
                spender: caller.to_string(),
                amount: allowance,
            });
        }

        if let Err(err) = self.assets.push(&self.address, receiver, assets) {
            self.unwind(before, applied);
            return Err(err.into());
        }
        self.state.tracked_assets = after.tracked_assets;
        Ok(())
    }

    /// Reverses `applied` effects, newest first, then restores `before`.
    fn unwind(&mut self, before: PoolState, applied: Vec<Undo>) {
        for undo in applied.into_iter().rev() {
            let result = match &undo {
                Undo::RefundAssets { to, amount } => self.assets.push(&self.address, to, *amount),
                Undo::RemintShares { to, amount } => self.shares.mint(to, *amount),
                Undo::RestoreAllowance {
                    owner,
                    spender,
                    amount,
                } => self.shares.approve(owner, spender, *amount),
            };
            if let Err(err) = result {
                tracing::error!(vault = %self.address, ?undo, %err, "failed to unwind ledger effect");
            }
        }
        self.state = before;
    }

    fn check_share_balance(
        &self,
        op: &'static str,
        caller: &str,
        owner: &str,
        shares: Amount,
    ) -> Result<(), VaultError> {
        let available = self.shares.balance_of(owner);
        if shares > available {
            return Err(self.reject(
                op,
                caller,
                VaultError::InsufficientBalance {
                    owner: owner.to_string(),
                    available,
                    requested: shares,
                },
            ));
        }
        Ok(())
    }

    fn check_authorization(
        &self,
        op: &'static str,
        caller: &str,
        owner: &str,
        shares: Amount,
    ) -> Result<(), VaultError> {
        if caller == owner {
            return Ok(());
        }
        let allowance = self.shares.allowance(owner, caller);
        if allowance < shares {
            return Err(self.reject(
                op,
                caller,
                VaultError::InsufficientAuthorization {
                    owner: owner.to_string(),
                    spender: caller.to_string(),
                    allowance,
                    required: shares,
                },
            ));
        }
        Ok(())
    }

    fn reject(&self, op: &'static str, caller: &str, err: VaultError) -> VaultError {
        tracing::warn!(vault = %self.address, op, caller, kind = err.kind(), "{op} rejected: {err}");
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
