//! # SATS Vault Contracts
//!
//! The state-mutating side of the SATS vault. A [`Vault`] takes custody of a
//! base asset and issues shares against it:
//!
//! - **Entry** — `deposit` (fix the assets) and `mint` (fix the shares).
//! - **Exit** — `withdraw` (fix the assets) and `redeem` (fix the shares),
//!   either for oneself or on an owner's behalf against a share allowance.
//! - **Views** — previews, conversions, limits, and a serializable snapshot.
//!
//! ## Design Principles
//!
//! 1. A failed call changes nothing: no counter, balance or allowance moves.
//! 2. Rounding always favors the vault, so no sequence of calls can extract
//!    more than was put in.
//! 3. The exchange rate reads tracked assets. Tokens sent straight to the
//!    vault's account are inert.
//! 4. Every public type is serializable (serde) for reports and replay.

pub mod error;
pub mod shared;
pub mod vault;

pub use error::VaultError;
pub use shared::SharedVault;
pub use vault::{Vault, VaultSnapshot};
