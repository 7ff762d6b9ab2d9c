//! Signing types

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::account::WalletId;
use crate::crypto::keys::ed25519::SIGNATURE_SIZE;
use crate::crypto::keys::path::KeyPath;
use crate::error::{Error, Result};

/// How an arbitrary-data payload was encoded by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Msgpack,
    Base64,
    #[default]
    None,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Msgpack => "msgpack",
            Self::Base64 => "base64",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Caller-supplied description of an arbitrary-data payload.
/// Recorded for audit; it never changes what gets signed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignMetadata {
    pub encoding: Encoding,
    /// JSON schema describing the payload
    pub schema: serde_json::Value,
}

impl SignMetadata {
    pub fn new(encoding: Encoding, schema: serde_json::Value) -> Self {
        Self { encoding, schema }
    }

    /// `title` of the schema, if it has one
    pub fn schema_title(&self) -> Option<&str> {
        self.schema.get("title").and_then(|title| title.as_str())
    }
}

/// Ed25519 signature, `R || S`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; SIGNATURE_SIZE]>::try_from(bytes).map(Self).map_err(|_| {
            Error::InvalidInput(format!(
                "Invalid signature length: expected {} bytes, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            ))
        })
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// 32-byte key agreement output. Wiped when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Signs opaque transaction payloads with a wallet key
pub trait TransactionSigner {
    fn sign_transaction(&self, payload: &[u8], wallet_id: &WalletId, path: &KeyPath) -> Result<Signature>;

    /// Sign every payload with the same key. Order is preserved and a failure
    /// on any payload fails the whole batch.
    fn sign_transactions(&self, payloads: &[Vec<u8>], wallet_id: &WalletId, path: &KeyPath) -> Result<Vec<Signature>>;
}

/// Signs arbitrary, non-transaction data
pub trait DataSigner {
    fn sign_data(
        &self,
        payload: &[u8],
        metadata: &SignMetadata,
        wallet_id: &WalletId,
        path: &KeyPath,
    ) -> Result<Signature>;
}
