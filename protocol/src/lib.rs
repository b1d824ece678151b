// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SATS Protocol — Core Library
//!
//! The arithmetic and interfaces underneath the SATS vault: a tokenized vault
//! where holders deposit a base asset and receive shares, denominated so that
//! one whole share is worth one satoshi-sized slice of a whole asset unit.
//!
//! ## Architecture
//!
//! - **config** — Vault parameters and the constants that define the genesis rate.
//! - **math** — The conversion engine. Pure functions, exact rounding, no wrapping.
//! - **pool** — The vault's two accounting counters and their checked transitions.
//! - **ledger** — What the vault needs from the asset and share ledgers, plus
//!   in-memory implementations.
//!
//! The state-mutating vault itself lives in the `sats-contracts` crate.
//!
//! ## Design Philosophy
//!
//! 1. Integer math only. Every division states its rounding direction.
//! 2. Overflow is an error, never a wrap.
//! 3. The exchange rate reads the vault's own counters, never a raw balance.
//! 4. If it touches money, it has tests. Plural.

pub mod config;
pub mod ledger;
pub mod math;
pub mod pool;

/// A token amount in the token's smallest subunit.
pub type Amount = u128;

pub use config::{ConfigError, VaultConfig};
pub use ledger::{Address, AssetLedger, LedgerError, ShareLedger};
pub use math::{ConversionEngine, MathError, Rounding};
pub use pool::PoolState;
