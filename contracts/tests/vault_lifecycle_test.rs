//! Integration tests for the vault lifecycle.
//!
//! Two holders enter and leave the vault through both entry paths
//! (deposit, mint) and both exit paths (withdraw, redeem), checking balances,
//! counters and the exchange rate at each step. Also covers third-party exits
//! against a share allowance.

use sats_contracts::{Vault, VaultError};
use sats_protocol::ledger::{AssetLedger, MemoryAssetLedger, MemoryShareLedger};
use sats_protocol::{Amount, VaultConfig};

const VAULT: &str = "vault:sats";

/// One whole asset unit (18 decimals).
const ONE: Amount = 1_000_000_000_000_000_000;

/// Share subunits per asset subunit at genesis.
const RATE: Amount = 100_000_000;

type MemoryVault = Vault<MemoryAssetLedger, MemoryShareLedger>;

/// Helper: a default vault with `deployer` holding 1 and `user` holding 0.5
/// asset units, both having approved the vault for everything.
fn funded_vault() -> MemoryVault {
    let mut assets = MemoryAssetLedger::new();
    assets.mint("deployer", ONE).unwrap();
    assets.mint("user", ONE / 2).unwrap();
    assets.approve("deployer", VAULT, Amount::MAX);
    assets.approve("user", VAULT, Amount::MAX);
    Vault::with_address(VaultConfig::default(), VAULT, assets, MemoryShareLedger::new()).unwrap()
}

fn assert_genesis_rate(vault: &MemoryVault) {
    assert_eq!(vault.preview_deposit(ONE).unwrap(), ONE * RATE);
    assert_eq!(vault.preview_mint(ONE * RATE).unwrap(), ONE);
    assert_eq!(vault.preview_withdraw(ONE).unwrap(), ONE * RATE);
    assert_eq!(vault.preview_redeem(ONE * RATE).unwrap(), ONE);
    assert_eq!(vault.price_per_share().unwrap(), 10_000_000_000);
}

// ---------------------------------------------------------------------------
// Initial State
// ---------------------------------------------------------------------------

#[test]
fn fresh_vault_metadata_and_rate() {
    let vault = funded_vault();
    assert_eq!(vault.name(), "Satoshi");
    assert_eq!(vault.symbol(), "SATS");
    assert_eq!(vault.decimals(), 18);
    assert_eq!(vault.total_shares(), 0);
    assert_eq!(vault.total_assets(), 0);
    assert_genesis_rate(&vault);
}

// ---------------------------------------------------------------------------
// Deposit & Withdraw
// ---------------------------------------------------------------------------

#[test]
fn deposit_then_withdraw_round_trip() {
    let mut vault = funded_vault();

    let preview = vault.preview_deposit(ONE).unwrap();
    let shares = vault.deposit("deployer", ONE, "deployer").unwrap();
    assert_eq!(shares, preview);
    assert_eq!(vault.share_balance_of("deployer"), ONE * RATE);
    assert_eq!(vault.total_assets(), ONE);
    assert_eq!(vault.total_shares(), ONE * RATE);

    let shares = vault.deposit("user", ONE / 2, "user").unwrap();
    assert_eq!(shares, ONE / 2 * RATE);
    assert_eq!(vault.total_shares(), 3 * ONE / 2 * RATE);
    assert_eq!(vault.total_assets(), 3 * ONE / 2);

    // Mixed deposits leave the rate untouched.
    assert_genesis_rate(&vault);

    let burned = vault.withdraw("deployer", ONE, "deployer", "deployer").unwrap();
    assert_eq!(burned, ONE * RATE);
    assert_eq!(vault.share_balance_of("deployer"), 0);
    assert_eq!(vault.total_assets(), ONE / 2);
    assert_eq!(vault.total_shares(), ONE / 2 * RATE);

    vault.withdraw("user", ONE / 2, "user", "user").unwrap();
    assert_eq!(vault.share_balance_of("user"), 0);
    assert_eq!(vault.total_assets(), 0);
    assert_eq!(vault.total_shares(), 0);

    assert_eq!(vault.asset_ledger().balance_of("deployer"), ONE);
    assert_eq!(vault.asset_ledger().balance_of("user"), ONE / 2);
    assert_eq!(vault.raw_asset_balance(), 0);
}

#[test]
fn later_depositor_exits_first() {
    let mut vault = funded_vault();
    vault.deposit("deployer", ONE, "deployer").unwrap();
    vault.deposit("user", ONE / 2, "user").unwrap();

    let burned = vault.withdraw("user", ONE / 2, "user", "user").unwrap();
    assert_eq!(burned, ONE / 2 * RATE);
    assert_eq!(vault.total_assets(), ONE);
    assert_eq!(vault.total_shares(), ONE * RATE);
    assert_genesis_rate(&vault);

    let out = vault
        .redeem("deployer", ONE * RATE, "deployer", "deployer")
        .unwrap();
    assert_eq!(out, ONE);
    assert_eq!(vault.total_assets(), 0);
    assert_eq!(vault.total_shares(), 0);
    assert_eq!(vault.raw_asset_balance(), 0);
    assert_eq!(vault.asset_ledger().balance_of("deployer"), ONE);
    assert_eq!(vault.asset_ledger().balance_of("user"), ONE / 2);
    assert!(vault.invariants_hold());
}

// ---------------------------------------------------------------------------
// Mint & Redeem
// ---------------------------------------------------------------------------

#[test]
fn mint_then_redeem_round_trip() {
    let mut vault = funded_vault();

    // Each holder mints as many shares as their whole balance buys.
    let deployer_shares = vault.preview_deposit(ONE).unwrap();
    let paid = vault.mint("deployer", deployer_shares, "deployer").unwrap();
    assert_eq!(paid, ONE);
    assert_eq!(vault.total_assets(), ONE);
    assert_eq!(vault.total_shares(), deployer_shares);

    let user_shares = vault.preview_deposit(ONE / 2).unwrap();
    let paid = vault.mint("user", user_shares, "user").unwrap();
    assert_eq!(paid, ONE / 2);
    assert_eq!(vault.total_assets(), 3 * ONE / 2);
    assert_eq!(vault.total_shares(), 3 * ONE / 2 * RATE);

    let out = vault
        .redeem("deployer", deployer_shares, "deployer", "deployer")
        .unwrap();
    assert_eq!(out, ONE);
    assert_eq!(vault.total_assets(), ONE / 2);
    assert_eq!(vault.total_shares(), ONE / 2 * RATE);

    let out = vault.redeem("user", user_shares, "user", "user").unwrap();
    assert_eq!(out, ONE / 2);
    assert_eq!(vault.total_assets(), 0);
    assert_eq!(vault.total_shares(), 0);
    assert!(vault.invariants_hold());
}

#[test]
fn entry_to_a_different_receiver() {
    let mut vault = funded_vault();
    vault.mint("deployer", RATE, "user").unwrap();
    assert_eq!(vault.share_balance_of("user"), RATE);
    assert_eq!(vault.asset_ledger().balance_of("deployer"), ONE - 1);

    // The receiver, not the payer, owns the position.
    assert!(matches!(
        vault.redeem("deployer", RATE, "deployer", "deployer"),
        Err(VaultError::InsufficientBalance { .. })
    ));
    assert_eq!(vault.redeem("user", RATE, "user", "user").unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[test]
fn operator_redeems_with_unlimited_allowance() {
    let mut vault = funded_vault();
    let shares = vault.deposit("user", ONE / 2, "user").unwrap();
    vault.approve_shares("user", "operator", Amount::MAX).unwrap();

    let out = vault.redeem("operator", shares / 2, "operator", "user").unwrap();
    assert_eq!(out, ONE / 4);
    assert_eq!(vault.asset_ledger().balance_of("operator"), ONE / 4);
    // Unlimited allowances are never drawn down.
    assert_eq!(vault.share_allowance("user", "operator"), Amount::MAX);
}

#[test]
fn operator_without_allowance_changes_nothing() {
    let mut vault = funded_vault();
    vault.deposit("user", ONE / 2, "user").unwrap();
    let before = vault.snapshot().unwrap();

    let result = vault.withdraw("operator", ONE / 4, "operator", "user");
    let Err(VaultError::InsufficientAuthorization {
        owner,
        spender,
        allowance,
        required,
    }) = result
    else {
        panic!("expected InsufficientAuthorization");
    };
    assert_eq!(owner, "user");
    assert_eq!(spender, "operator");
    assert_eq!(allowance, 0);
    assert_eq!(required, ONE / 4 * RATE);

    assert_eq!(vault.snapshot().unwrap(), before);
    assert_eq!(vault.asset_ledger().balance_of("operator"), 0);
}

#[test]
fn owner_needs_no_allowance_for_own_shares() {
    let mut vault = funded_vault();
    vault.deposit("user", ONE / 2, "user").unwrap();
    vault.withdraw("user", ONE / 2, "someone-else", "user").unwrap();
    assert_eq!(vault.asset_ledger().balance_of("someone-else"), ONE / 2);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn zero_amounts_rejected_on_every_path() {
    let mut vault = funded_vault();
    vault.deposit("deployer", ONE, "deployer").unwrap();
    let before = vault.pool_state();

    assert!(matches!(vault.deposit("user", 0, "user"), Err(VaultError::ZeroAssets)));
    assert!(matches!(vault.mint("user", 0, "user"), Err(VaultError::ZeroShares)));
    assert!(matches!(
        vault.withdraw("deployer", 0, "deployer", "deployer"),
        Err(VaultError::ZeroAssets)
    ));
    assert!(matches!(
        vault.redeem("deployer", 0, "deployer", "deployer"),
        Err(VaultError::ZeroShares)
    ));
    assert_eq!(vault.pool_state(), before);
}

#[test]
fn deposit_beyond_balance_fails_cleanly() {
    let mut vault = funded_vault();
    let result = vault.deposit("user", ONE, "user");
    assert!(matches!(result, Err(VaultError::Ledger(_))));
    assert_eq!(vault.total_assets(), 0);
    assert_eq!(vault.share_balance_of("user"), 0);
    assert_eq!(vault.asset_ledger().balance_of("user"), ONE / 2);
}

#[test]
fn error_kinds_are_stable() {
    let mut vault = funded_vault();
    let err = vault.deposit("user", 0, "user").unwrap_err();
    assert_eq!(err.kind(), "zero_assets");
    let err = vault.redeem("user", 1, "user", "user").unwrap_err();
    assert_eq!(err.kind(), "insufficient_balance");
}
