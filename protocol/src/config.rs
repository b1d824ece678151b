//! # Vault Configuration & Constants
//!
//! Every magic number in the vault lives here. The decimals offset in
//! particular is part of the vault's identity: it fixes the genesis exchange
//! rate and sizes the virtual liquidity that blunts donation attacks.
//! Changing it on a live vault would reprice every outstanding share, so it is
//! fixed at construction and nothing in this crate offers a setter.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default decimals offset. With an 18-decimals base asset, one whole share
/// (`10^18` share subunits) is worth `10^10` asset subunits, i.e. exactly one
/// satoshi-sized slice of a whole asset unit.
pub const DEFAULT_DECIMALS_OFFSET: u8 = 8;

/// Default base-asset precision. 18 is the ERC-20 convention.
pub const DEFAULT_ASSET_DECIMALS: u8 = 18;

/// Default share-token name.
pub const DEFAULT_VAULT_NAME: &str = "Satoshi";

/// Default share-token ticker.
pub const DEFAULT_VAULT_SYMBOL: &str = "SATS";

/// Largest exponent `n` for which `10^n` fits in a `u128`.
pub const MAX_POW10_EXPONENT: u32 = 38;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`VaultConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required text field was empty.
    #[error("config field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A decimals value whose power of ten cannot be represented.
    #[error("unsupported {field}: {value} (10^{value} must fit in 128 bits)")]
    UnsupportedDecimals {
        /// Which field was out of range.
        field: &'static str,
        /// The rejected value.
        value: u8,
    },

    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config document is not valid JSON for [`VaultConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Construction-time parameters of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VaultConfig {
    /// Share-token name (e.g. "Satoshi").
    pub name: String,
    /// Share-token ticker (e.g. "SATS").
    pub symbol: String,
    /// Subunit precision of the base asset.
    pub asset_decimals: u8,
    /// Exponent of the virtual share offset. Share subunits per asset subunit
    /// at genesis is `10^decimals_offset`.
    pub decimals_offset: u8,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_VAULT_NAME.to_string(),
            symbol: DEFAULT_VAULT_SYMBOL.to_string(),
            asset_decimals: DEFAULT_ASSET_DECIMALS,
            decimals_offset: DEFAULT_DECIMALS_OFFSET,
        }
    }
}

impl VaultConfig {
    /// Parses and validates a config from a JSON document.
    ///
    /// Missing fields fall back to their defaults; unknown fields are an error
    /// so that a typo like `decimal_offset` does not silently become 8.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            symbol = %config.symbol,
            decimals_offset = config.decimals_offset,
            "vault config loaded"
        );
        Ok(config)
    }

    /// Checks that every field is usable by the conversion engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyField("name"));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptyField("symbol"));
        }
        if u32::from(self.asset_decimals) > MAX_POW10_EXPONENT {
            return Err(ConfigError::UnsupportedDecimals {
                field: "asset_decimals",
                value: self.asset_decimals,
            });
        }
        if u32::from(self.decimals_offset) > MAX_POW10_EXPONENT {
            return Err(ConfigError::UnsupportedDecimals {
                field: "decimals_offset",
                value: self.decimals_offset,
            });
        }
        Ok(())
    }

    /// Decimals reported by the share token. Shares mirror the asset's
    /// precision; the offset lives in how many share subunits an asset
    /// subunit buys, not in the display precision.
    pub fn share_decimals(&self) -> u8 {
        self.asset_decimals
    }
}
