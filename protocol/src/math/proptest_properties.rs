//! Property-based tests using `proptest` for the conversion engine.
//!
//! 1. **Round-trip non-creation** — assets → shares → assets never grows.
//! 2. **Deposit then redeem** — exiting right after entering never profits.
//! 3. **Mint then redeem** — the ceiling-priced entry covers the floor-priced exit.
//! 4. **Rounding gap** — ceiling and floor differ by at most one subunit.
//!
//! States whose conversions overflow 128 bits are skipped; they surface as
//! `MathError::Overflow` and are covered by the unit tests.

use proptest::prelude::*;

use super::{ConversionEngine, Rounding};
use crate::pool::PoolState;
use crate::Amount;

const MAX_ASSETS: Amount = 1_000_000_000_000_000_000_000_000; // 10^24
const MAX_SHARES: Amount = 10_000_000_000_000_000_000_000_000_000_000_000; // 10^34

fn engine(offset: u8) -> ConversionEngine {
    let Ok(engine) = ConversionEngine::new(offset) else {
        panic!("valid offset");
    };
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn round_trip_never_creates_value(
        offset in 0u8..=12,
        tracked in 0..MAX_ASSETS,
        supply in 0..MAX_SHARES,
        assets in 1..MAX_ASSETS,
    ) {
        let e = engine(offset);
        let state = PoolState::new(tracked, supply);

        let Ok(shares) = e.convert_to_shares(assets, &state, Rounding::Floor) else {
            return Ok(());
        };
        let back = e.convert_to_assets(shares, &state, Rounding::Ceiling)?;
        prop_assert!(back <= assets, "{assets} -> {shares} -> {back}");

        let reshares = e.convert_to_shares(back, &state, Rounding::Floor)?;
        prop_assert!(reshares <= shares);
    }

    #[test]
    fn deposit_then_redeem_never_profits(
        offset in 0u8..=12,
        tracked in 0..MAX_ASSETS,
        supply in 0..MAX_SHARES,
        assets in 1..MAX_ASSETS,
    ) {
        let e = engine(offset);
        let before = PoolState::new(tracked, supply);

        let Ok(shares) = e.convert_to_shares(assets, &before, Rounding::Floor) else {
            return Ok(());
        };
        let Ok(after) = before.after_deposit(assets, shares) else {
            return Ok(());
        };
        let Ok(redeemed) = e.convert_to_assets(shares, &after, Rounding::Floor) else {
            return Ok(());
        };
        prop_assert!(redeemed <= assets, "paid {assets}, redeemed {redeemed}");
    }

    #[test]
    fn mint_then_redeem_never_profits(
        offset in 0u8..=12,
        tracked in 0..MAX_ASSETS,
        supply in 0..MAX_SHARES,
        shares in 1..MAX_SHARES,
    ) {
        let e = engine(offset);
        let before = PoolState::new(tracked, supply);

        let Ok(cost) = e.convert_to_assets(shares, &before, Rounding::Ceiling) else {
            return Ok(());
        };
        prop_assert!(cost > 0, "positive mint must cost something");

        let Ok(after) = before.after_deposit(cost, shares) else {
            return Ok(());
        };
        let Ok(redeemed) = e.convert_to_assets(shares, &after, Rounding::Floor) else {
            return Ok(());
        };
        prop_assert!(redeemed <= cost, "paid {cost}, redeemed {redeemed}");
    }

    #[test]
    fn ceiling_and_floor_differ_by_at_most_one(
        offset in 0u8..=12,
        tracked in 0..MAX_ASSETS,
        supply in 0..MAX_SHARES,
        amount in 0..MAX_ASSETS,
    ) {
        let e = engine(offset);
        let state = PoolState::new(tracked, supply);

        if let (Ok(floor), Ok(ceil)) = (
            e.convert_to_shares(amount, &state, Rounding::Floor),
            e.convert_to_shares(amount, &state, Rounding::Ceiling),
        ) {
            prop_assert!(ceil >= floor && ceil - floor <= 1);
        }

        if let (Ok(floor), Ok(ceil)) = (
            e.convert_to_assets(amount, &state, Rounding::Floor),
            e.convert_to_assets(amount, &state, Rounding::Ceiling),
        ) {
            prop_assert!(ceil >= floor && ceil - floor <= 1);
        }
    }
}
