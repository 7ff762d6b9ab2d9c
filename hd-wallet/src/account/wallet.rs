//! Wallet lifecycle: creation, import, deletion, backup and recovery

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::resolver::KeyContextResolver;
use super::store::{WalletId, WalletRecord, WalletStore};
use crate::config::EngineConfig;
use crate::crypto::keys::derivation::{
    DerivationEngine, DerivationType, ExtendedKey, ExtendedPrivateKey, ExtendedPublicKey,
};
use crate::crypto::keys::path::{KeyPath, KeyPurpose};
use crate::crypto::mnemonic::{Entropy, Mnemonic};
use crate::error::Result;

/// Public view of a wallet key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletKey {
    pub wallet_id: WalletId,
    pub path: KeyPath,
    pub public_key: [u8; 32],
}

/// A key found while scanning a phrase for used accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredKey {
    pub path: KeyPath,
    pub public_key: [u8; 32],
    /// `false` only for the `(0, 0)` fallback returned when nothing was active
    pub active: bool,
}

/// Wallet operations on top of a [`WalletStore`]
pub struct HdWalletService {
    store: Arc<dyn WalletStore>,
    resolver: KeyContextResolver,
    config: EngineConfig,
}

impl HdWalletService {
    pub fn new(store: Arc<dyn WalletStore>, config: EngineConfig) -> Self {
        let resolver = KeyContextResolver::new(store.clone());
        Self { store, resolver, config }
    }

    pub fn resolver(&self) -> &KeyContextResolver {
        &self.resolver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Persist a new wallet. Fresh entropy is generated when none is given.
    pub fn create_wallet(&self, entropy: Option<Entropy>) -> Result<WalletId> {
        let entropy = match entropy {
            Some(entropy) => entropy,
            None => Entropy::generate()?,
        };

        let wallet_id = WalletId::generate();
        self.store.insert(WalletRecord::new(wallet_id.clone(), entropy))?;
        info!(wallet_id = %wallet_id, "Created wallet");
        Ok(wallet_id)
    }

    /// Persist a wallet restored from a 24-word phrase
    pub fn import_wallet(&self, phrase: &str) -> Result<WalletId> {
        let mnemonic = Mnemonic::parse(phrase).map_err(|e| {
            warn!("Rejected mnemonic on import: {}", e);
            e
        })?;
        let entropy = mnemonic.to_entropy()?;

        let wallet_id = WalletId::generate();
        self.store.insert(WalletRecord::new(wallet_id.clone(), entropy))?;
        info!(wallet_id = %wallet_id, "Imported wallet");
        Ok(wallet_id)
    }

    /// Returns whether a wallet was removed
    pub fn delete_wallet(&self, wallet_id: &WalletId) -> Result<bool> {
        let deleted = self.store.delete(wallet_id)?;
        if deleted {
            info!(wallet_id = %wallet_id, "Deleted wallet");
        }
        Ok(deleted)
    }

    pub fn wallet_ids(&self) -> Result<Vec<WalletId>> {
        self.store.wallet_ids()
    }

    /// Recovery phrase for backup display
    pub fn mnemonic(&self, wallet_id: &WalletId) -> Result<Mnemonic> {
        self.resolver.mnemonic(wallet_id)
    }

    /// Address key `m/44'/283'/account'/0/0` under the configured derivation type
    pub fn generate_key(&self, wallet_id: &WalletId, account: u32) -> Result<WalletKey> {
        let path = KeyPath::address(account, 0, self.config.default_derivation_type);
        let public_key = self.resolver.public_key(wallet_id, &path)?;
        Ok(WalletKey { wallet_id: wallet_id.clone(), path, public_key })
    }

    /// Scan a phrase for used address keys.
    ///
    /// Key indices within an account are scanned until `gap_limit`
    /// consecutive inactive keys; accounts are scanned until `gap_limit`
    /// consecutive accounts pass without a hit. `is_active` decides whether
    /// a public key has been used. If nothing is active the first key is
    /// returned with `active == false`.
    pub fn recover_accounts<F>(
        &self,
        phrase: &str,
        derivation_type: DerivationType,
        mut is_active: F,
    ) -> Result<Vec<RecoveredKey>>
    where
        F: FnMut(&[u8; 32]) -> bool,
    {
        let seed = Mnemonic::parse(phrase)?.to_seed("");
        let root = ExtendedPrivateKey::from_seed(seed.as_bytes(), derivation_type)?;
        let gap_limit = self.config.gap_limit;

        let mut recovered = Vec::new();
        let mut first_key = None;
        let mut empty_accounts = 0;
        let mut account = 0u32;

        while empty_accounts < gap_limit {
            let chain = Self::address_chain(&root, account, derivation_type)?;
            let mut empty_keys = 0;
            let mut key_index = 0u32;

            while empty_keys < gap_limit {
                let child = DerivationEngine::derive_child_public(&chain, key_index, derivation_type)?;
                let path = KeyPath::address(account, key_index, derivation_type);
                let public_key = *child.public_key();

                if account == 0 && key_index == 0 {
                    first_key = Some(RecoveredKey { path, public_key, active: false });
                }

                if is_active(&public_key) {
                    debug!(path = %path, "Found active key");
                    recovered.push(RecoveredKey { path, public_key, active: true });
                    empty_keys = 0;
                    empty_accounts = 0;
                } else {
                    empty_keys += 1;
                }
                key_index += 1;
            }

            account += 1;
            empty_accounts += 1;
        }

        if recovered.is_empty() {
            recovered.extend(first_key);
        }

        info!(
            count = recovered.len(),
            accounts_scanned = account,
            derivation_type = %derivation_type,
            "Account recovery finished"
        );
        Ok(recovered)
    }

    /// Public node `m/44'/283'/account'/0`, from which key indices are soft-derived
    fn address_chain(
        root: &ExtendedPrivateKey,
        account: u32,
        derivation_type: DerivationType,
    ) -> Result<ExtendedPublicKey> {
        let segments = KeyPath::new(KeyPurpose::Address, account, 0, 0, derivation_type).segments()?;
        match DerivationEngine::derive_key(root, &segments[..4], false, derivation_type)? {
            ExtendedKey::Public(key) => Ok(key),
            ExtendedKey::Private(key) => Ok(key.to_public()),
        }
    }
}
