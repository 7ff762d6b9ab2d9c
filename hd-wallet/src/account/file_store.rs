//! Directory-backed wallet store
//!
//! Each wallet lives in `<dir>/<wallet_id>.json`. Writes go to a temp file
//! that is renamed into place, so a reader sees either no record or a
//! complete one.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::store::{WalletId, WalletRecord, WalletStore};
use crate::crypto::mnemonic::Entropy;
use crate::error::{Error, Result};

const RECORD_EXTENSION: &str = "json";
const CHECKSUM_SIZE: usize = 4;

/// On-disk JSON document
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredWallet {
    wallet_id: String,
    entropy: String,
    checksum: String,
}

fn checksum(entropy: &[u8]) -> String {
    hex::encode(&Sha256::digest(entropy)[..CHECKSUM_SIZE])
}

/// Wallet store persisting one JSON file per wallet
#[derive(Debug)]
pub struct FileWalletStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWalletStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file wallet store");
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, wallet_id: &WalletId) -> Result<PathBuf> {
        let id = wallet_id.as_str();
        let valid = !id.is_empty()
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::InvalidInput(format!(
                "Wallet id {:?} is not usable as a file name",
                id
            )));
        }
        Ok(self.dir.join(format!("{}.{}", id, RECORD_EXTENSION)))
    }

    fn decode(wallet_id: &WalletId, bytes: &[u8]) -> Result<WalletRecord> {
        let corrupted = |reason: String| {
            warn!(wallet_id = %wallet_id, reason = %reason, "Corrupted wallet record");
            Error::CorruptedRecord { wallet_id: wallet_id.to_string(), reason }
        };

        let stored: StoredWallet =
            serde_json::from_slice(bytes).map_err(|e| corrupted(format!("invalid JSON: {}", e)))?;

        if stored.wallet_id != wallet_id.as_str() {
            return Err(corrupted(format!("record belongs to {}", stored.wallet_id)));
        }

        let mut raw = hex::decode(&stored.entropy)
            .map_err(|e| corrupted(format!("invalid entropy encoding: {}", e)))?;
        let entropy = Entropy::try_from(raw.as_slice());
        let expected = checksum(&raw);
        raw.zeroize();

        let entropy = entropy.map_err(|e| corrupted(e.to_string()))?;
        if expected != stored.checksum {
            return Err(corrupted("checksum mismatch".to_string()));
        }

        Ok(WalletRecord::new(wallet_id.clone(), entropy))
    }
}

impl WalletStore for FileWalletStore {
    fn lookup(&self, wallet_id: &WalletId) -> Result<Option<WalletRecord>> {
        let path = self.record_path(wallet_id)?;
        let mut bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = Self::decode(wallet_id, &bytes);
        bytes.zeroize();
        record.map(Some)
    }

    fn insert(&self, record: WalletRecord) -> Result<()> {
        let path = self.record_path(record.wallet_id())?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Storage("wallet store lock poisoned".to_string()))?;

        if path.exists() {
            return Err(Error::WalletAlreadyExists(record.wallet_id().clone()));
        }

        let stored = StoredWallet {
            wallet_id: record.wallet_id().to_string(),
            entropy: hex::encode(record.entropy().as_bytes()),
            checksum: checksum(record.entropy().as_bytes()),
        };
        let mut bytes = serde_json::to_vec_pretty(&stored)
            .map_err(|e| Error::Storage(format!("failed to encode record: {}", e)))?;

        let tmp_path = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        let written = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            });
        bytes.zeroize();

        if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, &path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, wallet_id: &WalletId) -> Result<bool> {
        let path = self.record_path(wallet_id)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Storage("wallet store lock poisoned".to_string()))?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn wallet_ids(&self) -> Result<Vec<WalletId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(WalletId::from(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}
