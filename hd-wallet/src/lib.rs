//! HD Wallet Core - key management and signing engine
//!
//! This library turns 256-bit wallet entropy into a 24-word BIP-39 mnemonic
//! and seed, derives BIP32-Ed25519 keys along BIP-44 paths under either the
//! Peikert or Khovratovich derivation type, persists wallets behind a
//! [`account::WalletStore`], and signs transactions and arbitrary data with
//! the derived keys. Signatures verify as standard Ed25519.

pub mod error;
pub mod config;
pub mod observability;
pub mod crypto;
pub mod account;
pub mod signing;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use config::EngineConfig;
pub use crypto::{DerivationType, Entropy, KeyPath, KeyPurpose, Mnemonic};
pub use account::{FileWalletStore, HdWalletService, InMemoryWalletStore, KeyContextResolver, WalletId, WalletStore};
pub use signing::{DataSigner, Encoding, HdSigner, SharedSecret, SignMetadata, Signature, TransactionSigner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
