//! Key context resolution
//!
//! Turns a `(wallet id, key path)` pair into derived key material. This is the
//! only place that reads entropy out of a [`WalletStore`].

use std::sync::Arc;

use tracing::{debug, warn};

use super::store::{WalletId, WalletStore};
use crate::crypto::keys::derivation::{DerivationEngine, ExtendedKey, ExtendedPrivateKey};
use crate::crypto::keys::path::KeyPath;
use crate::crypto::mnemonic::{Mnemonic, Seed};
use crate::error::{Error, Result};

/// Resolves wallet keys on demand. Nothing derived is cached.
#[derive(Clone)]
pub struct KeyContextResolver {
    store: Arc<dyn WalletStore>,
}

impl KeyContextResolver {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Derive the key at `path` for `wallet_id`.
    ///
    /// Fails with [`Error::WalletNotFound`] if the store has no record (checked
    /// first), and with [`Error::InvalidInput`] if the account is outside the
    /// hardened range.
    pub fn resolve_key(&self, wallet_id: &WalletId, path: &KeyPath, is_private: bool) -> Result<ExtendedKey> {
        let seed = self.seed(wallet_id)?;
        let segments = path.segments()?;
        debug!(
            wallet_id = %wallet_id,
            path = %path,
            derivation_type = %path.derivation_type,
            "Resolving key"
        );

        DerivationEngine::derive_key_from_seed(seed.as_bytes(), &segments, is_private, path.derivation_type)
    }

    pub fn resolve_private_key(&self, wallet_id: &WalletId, path: &KeyPath) -> Result<ExtendedPrivateKey> {
        self.resolve_key(wallet_id, path, true)?.into_private()
    }

    /// 32-byte Ed25519 public key at `path`
    pub fn public_key(&self, wallet_id: &WalletId, path: &KeyPath) -> Result<[u8; 32]> {
        Ok(self.resolve_key(wallet_id, path, false)?.public_key())
    }

    /// Recovery phrase for a stored wallet
    pub fn mnemonic(&self, wallet_id: &WalletId) -> Result<Mnemonic> {
        let record = self.store.lookup(wallet_id)?.ok_or_else(|| {
            warn!(wallet_id = %wallet_id, "Wallet not found");
            Error::WalletNotFound(wallet_id.clone())
        })?;
        Ok(Mnemonic::from_entropy(record.entropy()))
    }

    fn seed(&self, wallet_id: &WalletId) -> Result<Seed> {
        Ok(self.mnemonic(wallet_id)?.to_seed(""))
    }
}
