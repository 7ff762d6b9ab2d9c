//! Signer over wallet-derived keys
//!
//! Every operation resolves its key through [`KeyContextResolver`], signs,
//! and lets the derived key drop (and wipe) before returning.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ecdh;
use super::types::{DataSigner, SharedSecret, SignMetadata, Signature, TransactionSigner};
use crate::account::{KeyContextResolver, WalletId, WalletStore};
use crate::crypto::keys::ed25519;
use crate::crypto::keys::path::KeyPath;
use crate::error::{Error, Result};

/// Protocol domain-separation prefixes. Data starting with one of these could
/// be a signable protocol object, so arbitrary-data signing refuses it.
pub const RESERVED_PREFIXES: &[&[u8]] = &[
    b"appID", b"arc", b"aB", b"aD", b"aO", b"aP", b"aS", b"AS", b"B256", b"BH", b"BR", b"CR",
    b"GE", b"KP", b"MA", b"MB", b"MX", b"NIC", b"NIR", b"NIV", b"NPR", b"OT1", b"OT2", b"PF",
    b"PL", b"Program", b"ProgData", b"progData", b"PS", b"PK", b"SD", b"SpecialAddr", b"STIB",
    b"spc", b"spm", b"spp", b"sps", b"spv", b"TE", b"TG", b"TL", b"TX", b"VO",
];

/// Signs payloads and computes shared secrets for stored wallets
#[derive(Clone)]
pub struct HdSigner {
    resolver: KeyContextResolver,
}

impl HdSigner {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self::with_resolver(KeyContextResolver::new(store))
    }

    pub fn with_resolver(resolver: KeyContextResolver) -> Self {
        Self { resolver }
    }

    /// Strict Ed25519 verification. Malformed input is simply invalid.
    pub fn verify_signature(&self, signature: &[u8], message: &[u8], public_key: &[u8]) -> bool {
        ed25519::verify(signature, message, public_key)
    }

    /// ECDH secret between the key at `path` and `other_public_key`.
    ///
    /// Both parties must agree on who goes first: one side passes
    /// `me_first = true`, the other `false`. Equal values on both sides
    /// produce two different secrets without any error.
    pub fn derive_shared_secret(
        &self,
        wallet_id: &WalletId,
        path: &KeyPath,
        other_public_key: &[u8],
        me_first: bool,
    ) -> Result<SharedSecret> {
        let key = self.resolver.resolve_private_key(wallet_id, path)?;
        let secret = ecdh::agree(&key, other_public_key, me_first).map_err(|e| {
            warn!(wallet_id = %wallet_id, path = %path, "Key agreement failed: {}", e);
            e
        })?;
        debug!(wallet_id = %wallet_id, path = %path, me_first, "Derived shared secret");
        Ok(secret)
    }
}

impl TransactionSigner for HdSigner {
    fn sign_transaction(&self, payload: &[u8], wallet_id: &WalletId, path: &KeyPath) -> Result<Signature> {
        let key = self.resolver.resolve_private_key(wallet_id, path)?;
        debug!(wallet_id = %wallet_id, path = %path, "Signing transaction");
        Ok(Signature::from_bytes(ed25519::sign(&key, payload)))
    }

    fn sign_transactions(&self, payloads: &[Vec<u8>], wallet_id: &WalletId, path: &KeyPath) -> Result<Vec<Signature>> {
        if payloads.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.resolver.resolve_private_key(wallet_id, path)?;
        debug!(wallet_id = %wallet_id, path = %path, count = payloads.len(), "Signing transaction batch");
        Ok(payloads
            .iter()
            .map(|payload| Signature::from_bytes(ed25519::sign(&key, payload)))
            .collect())
    }
}

impl DataSigner for HdSigner {
    fn sign_data(
        &self,
        payload: &[u8],
        metadata: &SignMetadata,
        wallet_id: &WalletId,
        path: &KeyPath,
    ) -> Result<Signature> {
        if let Some(prefix) = RESERVED_PREFIXES.iter().find(|prefix| payload.starts_with(prefix)) {
            warn!(
                wallet_id = %wallet_id,
                prefix = %String::from_utf8_lossy(prefix),
                "Refusing to sign data with a reserved prefix"
            );
            return Err(Error::InvalidInput(format!(
                "data starts with reserved prefix {:?}",
                String::from_utf8_lossy(prefix)
            )));
        }

        let key = self.resolver.resolve_private_key(wallet_id, path)?;
        info!(
            wallet_id = %wallet_id,
            path = %path,
            encoding = %metadata.encoding,
            schema = metadata.schema_title().unwrap_or("untitled"),
            "Signing arbitrary data"
        );
        Ok(Signature::from_bytes(ed25519::sign(&key, payload)))
    }
}
