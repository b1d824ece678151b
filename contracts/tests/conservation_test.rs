//! Property-based tests using `proptest` for vault-level conservation.
//!
//! Random sequences of deposits, mints, withdrawals, redemptions and
//! donations are replayed against one vault. Individual calls may be
//! rejected; whatever happens:
//!
//! 1. **Supply conservation** — the asset ledger's supply never changes.
//! 2. **Accounting** — the share counter mirrors the share supply and the
//!    vault's raw balance covers its tracked assets after every call.
//! 3. **Failed calls are inert** — a rejected call changes no balance.
//! 4. **No value creation** — once everyone exits, holders together own no
//!    more than they started with.

use proptest::prelude::*;

use sats_contracts::Vault;
use sats_protocol::ledger::{AssetLedger, MemoryAssetLedger, MemoryShareLedger};
use sats_protocol::{Amount, VaultConfig};

const VAULT: &str = "vault:sats";
const USERS: [&str; 3] = ["alice", "bob", "carol"];
const START_BALANCE: Amount = 1_000_000_000_000_000_000_000; // 1000 units

#[derive(Debug, Clone)]
enum Op {
    Deposit { user: usize, assets: Amount },
    Mint { user: usize, shares: Amount },
    Withdraw { user: usize, assets: Amount },
    /// Redeem `percent`% of the user's shares.
    Redeem { user: usize, percent: u8 },
    Donate { user: usize, assets: Amount },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let user = 0..USERS.len();
    prop_oneof![
        (user.clone(), 1..10_000_000_000_000_000_000u128)
            .prop_map(|(user, assets)| Op::Deposit { user, assets }),
        (user.clone(), 1..1_000_000_000_000_000_000_000_000_000u128)
            .prop_map(|(user, shares)| Op::Mint { user, shares }),
        (user.clone(), 1..10_000_000_000_000_000_000u128)
            .prop_map(|(user, assets)| Op::Withdraw { user, assets }),
        (user.clone(), 1..=100u8).prop_map(|(user, percent)| Op::Redeem { user, percent }),
        (user, 1..1_000_000_000_000_000_000u128).prop_map(|(user, assets)| Op::Donate { user, assets }),
    ]
}

fn funded_vault(offset: u8) -> Vault<MemoryAssetLedger, MemoryShareLedger> {
    let mut assets = MemoryAssetLedger::new();
    for user in USERS {
        let Ok(()) = assets.mint(user, START_BALANCE) else {
            panic!("faucet mint");
        };
        assets.approve(user, VAULT, Amount::MAX);
    }
    let config = VaultConfig {
        decimals_offset: offset,
        ..VaultConfig::default()
    };
    let Ok(vault) = Vault::with_address(config, VAULT, assets, MemoryShareLedger::new()) else {
        panic!("valid vault");
    };
    vault
}

fn balances(vault: &Vault<MemoryAssetLedger, MemoryShareLedger>) -> Vec<(Amount, Amount)> {
    USERS
        .iter()
        .map(|user| (vault.asset_ledger().balance_of(user), vault.share_balance_of(user)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_sequences_conserve_value(
        offset in 0u8..=10,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut vault = funded_vault(offset);
        let supply = vault.asset_ledger().total_supply();
        let mut donated: Amount = 0;

        for op in ops {
            let before = (balances(&vault), vault.pool_state());
            let result = match op {
                Op::Deposit { user, assets } => {
                    vault.deposit(USERS[user], assets, USERS[user]).map(|_| ())
                }
                Op::Mint { user, shares } => {
                    vault.mint(USERS[user], shares, USERS[user]).map(|_| ())
                }
                Op::Withdraw { user, assets } => vault
                    .withdraw(USERS[user], assets, USERS[user], USERS[user])
                    .map(|_| ()),
                Op::Redeem { user, percent } => {
                    let held = vault.share_balance_of(USERS[user]);
                    let shares = held / 100 * Amount::from(percent);
                    vault
                        .redeem(USERS[user], shares, USERS[user], USERS[user])
                        .map(|_| ())
                }
                Op::Donate { user, assets } => {
                    if vault.asset_ledger_mut().transfer(USERS[user], VAULT, assets).is_ok() {
                        donated += assets;
                    }
                    Ok(())
                }
            };

            if result.is_err() {
                prop_assert_eq!(&(balances(&vault), vault.pool_state()), &before);
            }
            prop_assert_eq!(vault.asset_ledger().total_supply(), supply);
            prop_assert!(vault.invariants_hold());
            prop_assert_eq!(
                vault.raw_asset_balance(),
                vault.total_assets() + donated
            );
        }

        // Everyone leaves with whatever their shares still fetch.
        for user in USERS {
            let held = vault.share_balance_of(user);
            if held > 0 && vault.preview_redeem(held).unwrap_or(0) > 0 {
                prop_assert!(vault.redeem(user, held, user, user).is_ok());
            }
        }

        let held_by_users: Amount = USERS
            .iter()
            .map(|user| vault.asset_ledger().balance_of(user))
            .sum();
        prop_assert!(held_by_users <= START_BALANCE * USERS.len() as Amount);
        prop_assert_eq!(held_by_users + vault.raw_asset_balance(), supply);
    }
}
