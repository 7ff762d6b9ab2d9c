//! Wallet record storage
//!
//! A wallet is persisted as its id and its 32 bytes of entropy, nothing
//! else. Records are immutable once inserted and only go away through an
//! explicit delete.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::mnemonic::Entropy;
use crate::error::{Error, Result};

/// Opaque, stable wallet identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WalletId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The persisted form of a wallet
#[derive(Debug, Clone)]
pub struct WalletRecord {
    wallet_id: WalletId,
    entropy: Entropy,
}

impl WalletRecord {
    pub fn new(wallet_id: WalletId, entropy: Entropy) -> Self {
        Self { wallet_id, entropy }
    }

    pub fn wallet_id(&self) -> &WalletId {
        &self.wallet_id
    }

    /// Raw wallet entropy.
    ///
    /// Reserved for [`WalletStore`] implementations, which must read it to
    /// persist the record. Within this crate the only other caller is
    /// [`KeyContextResolver`](crate::account::KeyContextResolver); code that
    /// needs keys, phrases or signatures goes through the resolver and never
    /// reads entropy from a record.
    pub fn entropy(&self) -> &Entropy {
        &self.entropy
    }
}

/// Storage backend for wallet records.
///
/// Implementations must never let `lookup` observe a partially written
/// record, and must refuse to overwrite an existing id.
pub trait WalletStore: Send + Sync {
    /// Fetch a record, `Ok(None)` if the id is unknown
    fn lookup(&self, wallet_id: &WalletId) -> Result<Option<WalletRecord>>;

    /// Insert a new record, failing with [`Error::WalletAlreadyExists`] if the id is taken
    fn insert(&self, record: WalletRecord) -> Result<()>;

    /// Remove a record. Returns whether anything was removed.
    fn delete(&self, wallet_id: &WalletId) -> Result<bool>;

    /// Ids of all stored wallets, sorted
    fn wallet_ids(&self) -> Result<Vec<WalletId>>;
}

/// In-memory implementation for development and testing
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<WalletId, Entropy>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> Error {
        Error::Storage("wallet store lock poisoned".to_string())
    }
}

impl WalletStore for InMemoryWalletStore {
    fn lookup(&self, wallet_id: &WalletId) -> Result<Option<WalletRecord>> {
        let wallets = self.wallets.read().map_err(Self::poisoned)?;
        Ok(wallets
            .get(wallet_id)
            .map(|entropy| WalletRecord::new(wallet_id.clone(), entropy.clone())))
    }

    fn insert(&self, record: WalletRecord) -> Result<()> {
        let mut wallets = self.wallets.write().map_err(Self::poisoned)?;
        if wallets.contains_key(record.wallet_id()) {
            return Err(Error::WalletAlreadyExists(record.wallet_id().clone()));
        }
        wallets.insert(record.wallet_id.clone(), record.entropy.clone());
        Ok(())
    }

    fn delete(&self, wallet_id: &WalletId) -> Result<bool> {
        let mut wallets = self.wallets.write().map_err(Self::poisoned)?;
        Ok(wallets.remove(wallet_id).is_some())
    }

    fn wallet_ids(&self) -> Result<Vec<WalletId>> {
        let wallets = self.wallets.read().map_err(Self::poisoned)?;
        let mut ids: Vec<WalletId> = wallets.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
