//! BIP-44 style key paths
//!
//! Every key is addressed by `m / 44' / coin_type' / account' / change / key_index`.
//! Purpose and coin type are fixed per [`KeyPurpose`]; the remaining
//! segments are supplied by the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::derivation::{DerivationType, HARDENED_OFFSET};
use crate::error::{Error, Result};

/// BIP-44 purpose segment
pub const BIP44_PURPOSE: u32 = 44;

/// Registered coin type for chain addresses
pub const ADDRESS_COIN_TYPE: u32 = 283;

/// Coin type used for identity keys
pub const IDENTITY_COIN_TYPE: u32 = 0;

/// What a derived key is used for. Selects the coin type segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPurpose {
    /// Account keys that own on-chain addresses
    #[default]
    Address,
    /// Identity keys (off-chain authentication, key agreement)
    Identity,
}

impl KeyPurpose {
    pub fn coin_type(self) -> u32 {
        match self {
            Self::Address => ADDRESS_COIN_TYPE,
            Self::Identity => IDENTITY_COIN_TYPE,
        }
    }
}

/// Location of one key in a wallet's derivation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPath {
    pub purpose: KeyPurpose,
    pub account: u32,
    pub change: u32,
    pub key_index: u32,
    pub derivation_type: DerivationType,
}

impl KeyPath {
    pub fn new(
        purpose: KeyPurpose,
        account: u32,
        change: u32,
        key_index: u32,
        derivation_type: DerivationType,
    ) -> Self {
        Self { purpose, account, change, key_index, derivation_type }
    }

    /// Address key `m/44'/283'/account'/0/key_index`
    pub fn address(account: u32, key_index: u32, derivation_type: DerivationType) -> Self {
        Self::new(KeyPurpose::Address, account, 0, key_index, derivation_type)
    }

    pub fn with_derivation_type(mut self, derivation_type: DerivationType) -> Self {
        self.derivation_type = derivation_type;
        self
    }

    /// The five raw path segments. Purpose, coin type and account are
    /// hardened; change and key index are passed through unchanged, so
    /// values at or above `2^31` derive as hardened steps.
    ///
    /// Accounts at or above `2^31` have no hardened representation and are
    /// rejected instead of being folded onto a lower account.
    pub fn segments(&self) -> Result<[u32; 5]> {
        if self.account >= HARDENED_OFFSET {
            return Err(Error::InvalidInput(format!(
                "Account index {} exceeds the hardened range",
                self.account
            )));
        }

        Ok([
            BIP44_PURPOSE | HARDENED_OFFSET,
            self.purpose.coin_type() | HARDENED_OFFSET,
            self.account | HARDENED_OFFSET,
            self.change,
            self.key_index,
        ])
    }

    /// Textual form, e.g. `m/44'/283'/0'/0/0`
    pub fn derivation_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            BIP44_PURPOSE,
            self.purpose.coin_type(),
            self.account,
            self.change,
            self.key_index
        )
    }
}

/// Parse a textual derivation path into raw segments.
///
/// Accepts `'` or `h` as the hardened marker, e.g. `m/44'/283'/0'/0/0`.
pub fn parse_derivation_path(path: &str) -> Result<Vec<u32>> {
    let path = path.trim();
    let rest = if path == "m" {
        ""
    } else {
        path.strip_prefix("m/")
            .ok_or_else(|| Error::InvalidInput(format!("Invalid derivation path: {}", path)))?
    };

    let mut result = Vec::new();
    for component in rest.split('/') {
        if component.is_empty() {
            continue;
        }

        let (digits, hardened) = match component.strip_suffix('\'').or_else(|| component.strip_suffix('h')) {
            Some(digits) => (digits, true),
            None => (component, false),
        };

        let index = u32::from_str(digits).map_err(|_| {
            Error::InvalidInput(format!("Invalid derivation path component: {}", component))
        })?;

        if hardened {
            if index >= HARDENED_OFFSET {
                return Err(Error::InvalidInput(format!(
                    "Hardened component out of range: {}",
                    component
                )));
            }
            result.push(index | HARDENED_OFFSET);
        } else {
            result.push(index);
        }
    }

    Ok(result)
}
