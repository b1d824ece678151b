//! # Share Conversion Math
//!
//! Pure arithmetic behind the vault's exchange rate. Nothing in here touches
//! a ledger, logs, or mutates state.
//!
//! ```text
//! rounding.rs    — Floor / Ceiling
//! mul_div.rs     — 256-bit multiply-then-divide with a rounding direction
//! conversion.rs  — ConversionEngine: assets <-> shares with virtual liquidity
//! ```

pub mod conversion;
pub mod mul_div;
pub mod rounding;

use thiserror::Error;

pub use conversion::ConversionEngine;
pub use mul_div::mul_div;
pub use rounding::Rounding;

/// Errors produced by the conversion arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// A result or intermediate exceeded the representable range.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero. Unreachable through [`ConversionEngine`], whose
    /// denominators always carry a positive virtual term.
    #[error("division by zero")]
    DivisionByZero,
}

#[cfg(test)]
mod proptest_properties;
