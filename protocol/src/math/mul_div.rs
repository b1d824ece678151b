//! Full-precision `value × numerator / denominator`.
//!
//! Amounts are `u128`, so the product of two of them needs up to 256 bits.
//! The multiplication happens in [`U256`] and only the quotient is narrowed
//! back, which means intermediate products never wrap or truncate.

use primitive_types::U256;

use super::rounding::Rounding;
use super::MathError;
use crate::Amount;

/// Computes `value × numerator / denominator` with the given rounding.
///
/// # Errors
///
/// Returns [`MathError::DivisionByZero`] if `denominator` is zero and
/// [`MathError::Overflow`] if the quotient does not fit in an [`Amount`].
pub fn mul_div(
    value: Amount,
    numerator: Amount,
    denominator: Amount,
    rounding: Rounding,
) -> Result<Amount, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }

    let product = U256::from(value)
        .checked_mul(U256::from(numerator))
        .ok_or(MathError::Overflow)?;
    let (quotient, remainder) = product.div_mod(U256::from(denominator));

    let quotient = match rounding {
        Rounding::Floor => quotient,
        Rounding::Ceiling if remainder.is_zero() => quotient,
        Rounding::Ceiling => quotient
            .checked_add(U256::one())
            .ok_or(MathError::Overflow)?,
    };

    narrow(quotient)
}

/// Narrows a 256-bit value back to an [`Amount`].
fn narrow(value: U256) -> Result<Amount, MathError> {
    if value > U256::from(Amount::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}
