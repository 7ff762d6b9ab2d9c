//! Error types for the hd-wallet library

use thiserror::Error;

use crate::account::WalletId;

/// Custom error type for hd-wallet operations
#[derive(Error, Debug)]
pub enum Error {
    /// Checksum mismatch, unknown word or bad word count while importing a phrase
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Wallet already exists: {0}")]
    WalletAlreadyExists(WalletId),

    #[error("Invalid entropy length: expected 32 bytes, got {len}")]
    InvalidEntropy { len: usize },

    #[error("Entropy generation failed: {0}")]
    EntropyGeneration(String),

    #[error("Key derivation error: {0}")]
    DerivationFailed(String),

    #[error("Signing error: {0}")]
    SigningFailed(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Corrupted wallet record {wallet_id}: {reason}")]
    CorruptedRecord { wallet_id: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller can reasonably recover, e.g. by re-prompting for a
    /// phrase or re-importing a wallet. Cryptographic and storage failures are
    /// never recoverable for the operation that raised them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidMnemonic(_)
                | Self::WalletNotFound(_)
                | Self::InvalidPublicKey(_)
                | Self::InvalidInput(_)
        )
    }
}

/// Result type for hd-wallet operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::InvalidMnemonic("checksum".to_string()).is_recoverable());
        assert!(Error::WalletNotFound(WalletId::from("w1")).is_recoverable());
        assert!(!Error::DerivationFailed("bad seed".to_string()).is_recoverable());
        assert!(!Error::SigningFailed("primitive".to_string()).is_recoverable());
        assert!(!Error::CorruptedRecord {
            wallet_id: "w1".to_string(),
            reason: "checksum".to_string(),
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidEntropy { len: 16 };
        assert_eq!(err.to_string(), "Invalid entropy length: expected 32 bytes, got 16");

        let err = Error::WalletNotFound(WalletId::from("abc"));
        assert_eq!(err.to_string(), "Wallet not found: abc");
    }
}
