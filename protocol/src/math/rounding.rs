//! Rounding direction for integer division.

use serde::{Deserialize, Serialize};

/// Direction applied to the integer division at the end of every conversion.
///
/// The vault always picks the direction that favors itself: `Floor` when it
/// pays out, `Ceiling` when it collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Truncate toward zero.
    Floor,
    /// Round up whenever the division leaves a remainder.
    Ceiling,
}

impl std::fmt::Display for Rounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rounding::Floor => write!(f, "floor"),
            Rounding::Ceiling => write!(f, "ceiling"),
        }
    }
}
