//! BIP32-Ed25519 hierarchical key derivation
//!
//! Extended private keys are `kL || kR || chain code` (96 bytes), extended
//! public keys are `A || chain code` (64 bytes). Child derivation follows
//! BIP32-Ed25519 with little-endian indices; the two [`DerivationType`]
//! variants differ only in how many high bits of `ZL` are truncated before
//! the child scalar is computed, which is enough to make every key below the
//! root differ between variants.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::ed25519;
use super::path::parse_derivation_path;
use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// First hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Serialized extended private key size: kL, kR and chain code
pub const XPRV_SIZE: usize = 96;

/// Serialized extended public key size: public key and chain code
pub const XPUB_SIZE: usize = 64;

pub const CHAIN_CODE_SIZE: usize = 32;

/// Seeds shorter than this are not accepted as derivation roots
const MIN_SEED_SIZE: usize = 16;

/// Derivation algorithm variant.
///
/// A key derived under one variant can only be re-derived under the same
/// variant. Deriving with the other one yields a different, equally valid
/// looking key and no error, so the variant used for an address must be
/// stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivationType {
    /// Truncates 9 bits of `ZL`; supports deep paths with a full-size
    /// scalar space. Default for new wallets.
    #[default]
    Peikert,
    /// Original BIP32-Ed25519: truncates 32 bits (`ZL` to 28 bytes)
    Khovratovich,
}

impl DerivationType {
    /// Number of high bits cleared from `ZL` at every derivation step
    pub fn truncated_bits(self) -> u32 {
        match self {
            Self::Peikert => 9,
            Self::Khovratovich => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peikert => "peikert",
            Self::Khovratovich => "khovratovich",
        }
    }
}

impl fmt::Display for DerivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DerivationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peikert" => Ok(Self::Peikert),
            "khovratovich" => Ok(Self::Khovratovich),
            other => Err(Error::InvalidInput(format!("Unknown derivation type: {}", other))),
        }
    }
}

/// Extended private key. Wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedPrivateKey {
    kl: [u8; 32],
    kr: [u8; 32],
    chain_code: [u8; CHAIN_CODE_SIZE],
    depth: u8,
    #[zeroize(skip)]
    derivation_type: DerivationType,
}

impl ExtendedPrivateKey {
    /// Build the root key from a BIP-39 seed.
    ///
    /// `k = SHA512(seed)`, re-hashed with `HMAC-SHA512(kL, kR)` until the
    /// third highest bit of `kL` is clear, then clamped. The root chain code
    /// is `SHA256(0x01 || seed)`.
    pub fn from_seed(seed: &[u8], derivation_type: DerivationType) -> Result<Self> {
        if seed.len() < MIN_SEED_SIZE {
            return Err(Error::DerivationFailed(format!(
                "Invalid seed length: expected at least {} bytes, got {}",
                MIN_SEED_SIZE,
                seed.len()
            )));
        }

        let mut k = Zeroizing::new([0u8; 64]);
        k.copy_from_slice(&Sha512::digest(seed));

        while k[31] & 0b0010_0000 != 0 {
            let mut mac = HmacSha512::new_from_slice(&k[..32])
                .map_err(|e| Error::DerivationFailed(format!("HMAC init failed: {}", e)))?;
            mac.update(&k[32..]);
            k.copy_from_slice(&mac.finalize().into_bytes());
        }

        let mut kl = [0u8; 32];
        let mut kr = [0u8; 32];
        kl.copy_from_slice(&k[..32]);
        kr.copy_from_slice(&k[32..]);

        kl[0] &= 0b1111_1000;
        kl[31] &= 0b0111_1111;
        kl[31] |= 0b0100_0000;

        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        chain_code.copy_from_slice(&Sha256::new().chain_update([0x01]).chain_update(seed).finalize());

        Ok(Self { kl, kr, chain_code, depth: 0, derivation_type })
    }

    /// Parse a 96-byte `kL || kR || chain code` buffer as a root-level key
    pub fn from_bytes(bytes: &[u8], derivation_type: DerivationType) -> Result<Self> {
        if bytes.len() != XPRV_SIZE {
            return Err(Error::DerivationFailed(format!(
                "Invalid extended private key length: expected {} bytes, got {}",
                XPRV_SIZE,
                bytes.len()
            )));
        }

        let mut kl = [0u8; 32];
        let mut kr = [0u8; 32];
        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        kl.copy_from_slice(&bytes[..32]);
        kr.copy_from_slice(&bytes[32..64]);
        chain_code.copy_from_slice(&bytes[64..]);

        if kl[0] & 0b0000_0111 != 0 {
            return Err(Error::DerivationFailed(
                "Invalid extended private key: scalar is not a multiple of 8".to_string(),
            ));
        }

        Ok(Self { kl, kr, chain_code, depth: 0, derivation_type })
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; XPRV_SIZE]> {
        let mut out = Zeroizing::new([0u8; XPRV_SIZE]);
        out[..32].copy_from_slice(&self.kl);
        out[32..64].copy_from_slice(&self.kr);
        out[64..].copy_from_slice(&self.chain_code);
        out
    }

    /// Left half: the signing scalar (little endian, not reduced)
    pub fn scalar_bytes(&self) -> &[u8; 32] {
        &self.kl
    }

    /// Right half: the nonce prefix used when signing
    pub(crate) fn nonce_prefix(&self) -> &[u8; 32] {
        &self.kr
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn derivation_type(&self) -> DerivationType {
        self.derivation_type
    }

    /// The Ed25519 public key `kL·B`
    pub fn public_key(&self) -> [u8; 32] {
        ed25519::public_key_from_scalar(&self.kl)
    }

    pub fn to_public(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            public_key: self.public_key(),
            chain_code: self.chain_code,
            depth: self.depth,
            derivation_type: self.derivation_type,
        }
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("depth", &self.depth)
            .field("derivation_type", &self.derivation_type)
            .finish_non_exhaustive()
    }
}

/// Extended public key, usable for soft (non-hardened) child derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    public_key: [u8; 32],
    chain_code: [u8; CHAIN_CODE_SIZE],
    depth: u8,
    derivation_type: DerivationType,
}

impl ExtendedPublicKey {
    /// Parse a 64-byte `A || chain code` buffer as a root-level key
    pub fn from_bytes(bytes: &[u8], derivation_type: DerivationType) -> Result<Self> {
        if bytes.len() != XPUB_SIZE {
            return Err(Error::DerivationFailed(format!(
                "Invalid extended public key length: expected {} bytes, got {}",
                XPUB_SIZE,
                bytes.len()
            )));
        }

        let mut public_key = [0u8; 32];
        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        public_key.copy_from_slice(&bytes[..32]);
        chain_code.copy_from_slice(&bytes[32..]);

        ed25519::decompress(&public_key)
            .map_err(|e| Error::DerivationFailed(format!("Invalid extended public key: {}", e)))?;

        Ok(Self { public_key, chain_code, depth: 0, derivation_type })
    }

    pub fn to_bytes(&self) -> [u8; XPUB_SIZE] {
        let mut out = [0u8; XPUB_SIZE];
        out[..32].copy_from_slice(&self.public_key);
        out[32..].copy_from_slice(&self.chain_code);
        out
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn derivation_type(&self) -> DerivationType {
        self.derivation_type
    }
}

/// A node in the derivation tree
#[derive(Debug, Clone)]
pub enum ExtendedKey {
    Private(ExtendedPrivateKey),
    Public(ExtendedPublicKey),
}

impl ExtendedKey {
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// The Ed25519 public key of this node
    pub fn public_key(&self) -> [u8; 32] {
        match self {
            Self::Private(key) => key.public_key(),
            Self::Public(key) => *key.public_key(),
        }
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_SIZE] {
        match self {
            Self::Private(key) => key.chain_code(),
            Self::Public(key) => key.chain_code(),
        }
    }

    pub fn depth(&self) -> u8 {
        match self {
            Self::Private(key) => key.depth(),
            Self::Public(key) => key.depth(),
        }
    }

    pub fn derivation_type(&self) -> DerivationType {
        match self {
            Self::Private(key) => key.derivation_type(),
            Self::Public(key) => key.derivation_type(),
        }
    }

    /// Key bytes: `kL || kR` for private nodes, `A` for public nodes
    pub fn key_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Self::Private(key) => {
                let mut bytes = Vec::with_capacity(64);
                bytes.extend_from_slice(&key.kl);
                bytes.extend_from_slice(&key.kr);
                Zeroizing::new(bytes)
            }
            Self::Public(key) => Zeroizing::new(key.public_key.to_vec()),
        }
    }

    /// Take the private node, failing for public nodes
    pub fn into_private(self) -> Result<ExtendedPrivateKey> {
        match self {
            Self::Private(key) => Ok(key),
            Self::Public(_) => Err(Error::DerivationFailed(
                "Expected an extended private key".to_string(),
            )),
        }
    }
}

/// Stateless BIP32-Ed25519 derivation
pub struct DerivationEngine;

impl DerivationEngine {
    /// Walk `path` from `root`, applying `derivation_type` at every step.
    ///
    /// With `is_private == false` the walk still happens on private keys (so
    /// hardened segments are allowed) and the public node is returned.
    pub fn derive_key(
        root: &ExtendedPrivateKey,
        path: &[u32],
        is_private: bool,
        derivation_type: DerivationType,
    ) -> Result<ExtendedKey> {
        let mut node = root.clone();
        for index in path {
            node = Self::derive_child_private(&node, *index, derivation_type)?;
        }

        if is_private {
            Ok(ExtendedKey::Private(node))
        } else {
            Ok(ExtendedKey::Public(node.to_public()))
        }
    }

    /// Rebuild the root key from `seed` and walk `path`
    pub fn derive_key_from_seed(
        seed: &[u8],
        path: &[u32],
        is_private: bool,
        derivation_type: DerivationType,
    ) -> Result<ExtendedKey> {
        let root = ExtendedPrivateKey::from_seed(seed, derivation_type)?;
        Self::derive_key(&root, path, is_private, derivation_type)
    }

    /// Walk a textual path such as `m/44'/283'/0'/0/0` from `root`
    pub fn derive_key_from_path(
        root: &ExtendedPrivateKey,
        path: &str,
        is_private: bool,
        derivation_type: DerivationType,
    ) -> Result<ExtendedKey> {
        let segments = parse_derivation_path(path)?;
        Self::derive_key(root, &segments, is_private, derivation_type)
    }

    /// Single derivation step. Public keys only support soft indices.
    pub fn derive_child(
        key: &ExtendedKey,
        index: u32,
        derivation_type: DerivationType,
    ) -> Result<ExtendedKey> {
        match key {
            ExtendedKey::Private(key) => Self::derive_child_private(key, index, derivation_type)
                .map(ExtendedKey::Private),
            ExtendedKey::Public(key) => Self::derive_child_public(key, index, derivation_type)
                .map(ExtendedKey::Public),
        }
    }

    pub fn derive_child_private(
        parent: &ExtendedPrivateKey,
        index: u32,
        derivation_type: DerivationType,
    ) -> Result<ExtendedPrivateKey> {
        Self::check_variant(parent.depth, parent.derivation_type, derivation_type)?;
        let depth = Self::next_depth(parent.depth)?;

        let mut z_mac = Self::hmac(&parent.chain_code)?;
        let mut c_mac = Self::hmac(&parent.chain_code)?;
        let index_bytes = index.to_le_bytes();

        if index >= HARDENED_OFFSET {
            z_mac.update(&[0x00]);
            z_mac.update(&parent.kl);
            z_mac.update(&parent.kr);
            c_mac.update(&[0x01]);
            c_mac.update(&parent.kl);
            c_mac.update(&parent.kr);
        } else {
            let public_key = parent.public_key();
            z_mac.update(&[0x02]);
            z_mac.update(&public_key);
            c_mac.update(&[0x03]);
            c_mac.update(&public_key);
        }
        z_mac.update(&index_bytes);
        c_mac.update(&index_bytes);

        let mut z = Zeroizing::new([0u8; 64]);
        z.copy_from_slice(&z_mac.finalize().into_bytes());
        let c = c_mac.finalize().into_bytes();

        let mut zl = Zeroizing::new([0u8; 32]);
        zl.copy_from_slice(&z[..32]);
        truncate_high_bits(&mut zl, derivation_type.truncated_bits());

        // kL' = kL + 8 * trunc(ZL), kR' = kR + ZR mod 2^256
        let kl = add_mul8(&parent.kl, &zl).ok_or_else(|| {
            Error::DerivationFailed(format!("Child scalar overflow at index {}", index))
        })?;
        let kr = add_mod_256(&parent.kr, &z[32..]);

        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        chain_code.copy_from_slice(&c[32..]);

        Ok(ExtendedPrivateKey { kl, kr, chain_code, depth, derivation_type })
    }

    pub fn derive_child_public(
        parent: &ExtendedPublicKey,
        index: u32,
        derivation_type: DerivationType,
    ) -> Result<ExtendedPublicKey> {
        if index >= HARDENED_OFFSET {
            return Err(Error::DerivationFailed(format!(
                "Hardened index {} cannot be derived from a public key",
                index
            )));
        }
        Self::check_variant(parent.depth, parent.derivation_type, derivation_type)?;
        let depth = Self::next_depth(parent.depth)?;

        let mut z_mac = Self::hmac(&parent.chain_code)?;
        let mut c_mac = Self::hmac(&parent.chain_code)?;
        let index_bytes = index.to_le_bytes();

        z_mac.update(&[0x02]);
        z_mac.update(&parent.public_key);
        z_mac.update(&index_bytes);
        c_mac.update(&[0x03]);
        c_mac.update(&parent.public_key);
        c_mac.update(&index_bytes);

        let z = z_mac.finalize().into_bytes();
        let c = c_mac.finalize().into_bytes();

        let mut zl = [0u8; 32];
        zl.copy_from_slice(&z[..32]);
        truncate_high_bits(&mut zl, derivation_type.truncated_bits());

        // A' = A + (8 * trunc(ZL))·B
        let tweak = add_mul8(&[0u8; 32], &zl).ok_or_else(|| {
            Error::DerivationFailed(format!("Child tweak overflow at index {}", index))
        })?;
        let public_key = ed25519::add_base_multiple(&parent.public_key, &tweak)?;

        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        chain_code.copy_from_slice(&c[32..]);

        Ok(ExtendedPublicKey { public_key, chain_code, depth, derivation_type })
    }

    fn hmac(chain_code: &[u8; CHAIN_CODE_SIZE]) -> Result<HmacSha512> {
        HmacSha512::new_from_slice(chain_code)
            .map_err(|e| Error::DerivationFailed(format!("HMAC init failed: {}", e)))
    }

    // The root may be walked under either variant; below it the variant is fixed.
    fn check_variant(depth: u8, current: DerivationType, requested: DerivationType) -> Result<()> {
        if depth > 0 && current != requested {
            return Err(Error::DerivationFailed(format!(
                "Derivation type mismatch: key derived with {}, requested {}",
                current, requested
            )));
        }
        Ok(())
    }

    fn next_depth(depth: u8) -> Result<u8> {
        depth
            .checked_add(1)
            .ok_or_else(|| Error::DerivationFailed("Maximum derivation depth exceeded".to_string()))
    }
}

/// Clear the `bits` most significant bits of a little-endian 256-bit value
fn truncate_high_bits(bytes: &mut [u8; 32], bits: u32) {
    let mut remaining = bits;
    for byte in bytes.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        if remaining >= 8 {
            *byte = 0;
            remaining -= 8;
        } else {
            *byte &= 0xFF >> remaining;
            remaining = 0;
        }
    }
}

/// `x + 8 * y` over little-endian 256-bit integers, `None` on overflow
fn add_mul8(x: &[u8; 32], y: &[u8; 32]) -> Option<[u8; 32]> {
    let mut carry: u16 = 0;
    let mut out = [0u8; 32];
    for i in 0..32 {
        let r = x[i] as u16 + ((y[i] as u16) << 3) + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
    if carry != 0 {
        return None;
    }
    Some(out)
}

/// `x + y mod 2^256` over little-endian integers
fn add_mod_256(x: &[u8; 32], y: &[u8]) -> [u8; 32] {
    let mut carry: u16 = 0;
    let mut out = [0u8; 32];
    for i in 0..32 {
        let r = x[i] as u16 + y[i] as u16 + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mnemonic::{seed_from_entropy, Entropy};

    const H: u32 = HARDENED_OFFSET;

    fn zero_root(derivation_type: DerivationType) -> ExtendedPrivateKey {
        let seed = seed_from_entropy(&Entropy::from_bytes([0u8; 32]));
        ExtendedPrivateKey::from_seed(seed.as_bytes(), derivation_type).unwrap()
    }

    #[test]
    fn test_root_from_seed_vector() {
        let root = zero_root(DerivationType::Peikert);
        let bytes = root.to_bytes();
        assert_eq!(
            hex::encode(&bytes[..32]),
            "e05a501cfcca148dd30c39b57df599977af248de751653bc74dd27b9acb64747"
        );
        assert_eq!(
            hex::encode(&bytes[32..64]),
            "d1232d10bf0eb1fecaeeacec09a643690cb2c1d9c558a65bd1cae6046e911eb2"
        );
        assert_eq!(
            hex::encode(&bytes[64..]),
            "12de8708d6e8c827665e135b7e2a5ad49fbd2fd1ad7b7c615f2487cf58b5f4b8"
        );
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn test_root_is_clamped() {
        let root = zero_root(DerivationType::Khovratovich);
        let kl = root.scalar_bytes();
        assert_eq!(kl[0] & 0b0000_0111, 0);
        assert_eq!(kl[31] & 0b1000_0000, 0);
        assert_eq!(kl[31] & 0b0100_0000, 0b0100_0000);
        assert_eq!(kl[31] & 0b0010_0000, 0);
    }

    #[test]
    fn test_short_seed_rejected() {
        let result = ExtendedPrivateKey::from_seed(&[0u8; 8], DerivationType::Peikert);
        assert!(matches!(result, Err(Error::DerivationFailed(_))));
    }

    #[test]
    fn test_path_vectors() {
        let path = [44 | H, 283 | H, H, 0, 0];
        for (derivation_type, expected) in [
            (
                DerivationType::Peikert,
                "46226393edc4f31c3cc52b6af3fe75166b05c0aad213dfdba9736679f039260f",
            ),
            (
                DerivationType::Khovratovich,
                "c24accc2ce6116c4262242b1e2d5c586afddc4293e57a298e5f439407eb0bc4a",
            ),
        ] {
            let root = zero_root(derivation_type);
            let key = DerivationEngine::derive_key(&root, &path, false, derivation_type).unwrap();
            assert!(!key.is_private());
            assert_eq!(key.depth(), 5);
            assert_eq!(hex::encode(key.public_key()), expected);
        }
    }

    #[test]
    fn test_textual_path_matches_segments() {
        let root = zero_root(DerivationType::Peikert);
        let key = DerivationEngine::derive_key_from_path(&root, "m/44'/283'/0'/0/0", false, DerivationType::Peikert)
            .unwrap();
        assert_eq!(
            hex::encode(key.public_key()),
            "46226393edc4f31c3cc52b6af3fe75166b05c0aad213dfdba9736679f039260f"
        );

        let err = DerivationEngine::derive_key_from_path(&root, "44'/283'", true, DerivationType::Peikert).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_private_and_public_walk_agree() {
        let root = zero_root(DerivationType::Peikert);
        let path = [44 | H, 283 | H, H, 0, 7];
        let private = DerivationEngine::derive_key(&root, &path, true, DerivationType::Peikert).unwrap();
        let public = DerivationEngine::derive_key(&root, &path, false, DerivationType::Peikert).unwrap();
        assert_eq!(private.public_key(), public.public_key());
        assert_eq!(private.chain_code(), public.chain_code());
    }

    #[test]
    fn test_soft_public_derivation_matches_private() {
        for derivation_type in [DerivationType::Peikert, DerivationType::Khovratovich] {
            let root = zero_root(derivation_type);
            let account = DerivationEngine::derive_key(&root, &[44 | H, 283 | H, H], true, derivation_type)
                .unwrap()
                .into_private()
                .unwrap();

            for index in [0u32, 1, 42, H - 1] {
                let via_private = DerivationEngine::derive_child_private(&account, index, derivation_type).unwrap();
                let via_public =
                    DerivationEngine::derive_child_public(&account.to_public(), index, derivation_type).unwrap();
                assert_eq!(via_private.to_public(), via_public);
            }
        }
    }

    #[test]
    fn test_hardened_public_derivation_rejected() {
        let root = zero_root(DerivationType::Peikert);
        let result = DerivationEngine::derive_child(
            &ExtendedKey::Public(root.to_public()),
            H,
            DerivationType::Peikert,
        );
        assert!(matches!(result, Err(Error::DerivationFailed(_))));
    }

    #[test]
    fn test_variants_diverge() {
        let path = [44 | H, 283 | H, H, 0, 0];
        let peikert = DerivationEngine::derive_key(&zero_root(DerivationType::Peikert), &path, true, DerivationType::Peikert)
            .unwrap()
            .into_private()
            .unwrap();
        let khovratovich = DerivationEngine::derive_key(
            &zero_root(DerivationType::Khovratovich),
            &path,
            true,
            DerivationType::Khovratovich,
        )
        .unwrap()
        .into_private()
        .unwrap();

        assert_ne!(peikert.to_bytes()[..], khovratovich.to_bytes()[..]);
        assert_ne!(peikert.public_key(), khovratovich.public_key());
        assert_ne!(peikert.public_key(), [0u8; 32]);
    }

    #[test]
    fn test_variant_mixing_rejected() {
        let root = zero_root(DerivationType::Peikert);
        let child = DerivationEngine::derive_child_private(&root, H, DerivationType::Peikert).unwrap();
        let result = DerivationEngine::derive_child_private(&child, 0, DerivationType::Khovratovich);
        assert!(matches!(result, Err(Error::DerivationFailed(_))));
    }

    #[test]
    fn test_extended_key_bytes_roundtrip() {
        let root = zero_root(DerivationType::Peikert);
        let parsed = ExtendedPrivateKey::from_bytes(&root.to_bytes()[..], DerivationType::Peikert).unwrap();
        assert_eq!(parsed.to_bytes()[..], root.to_bytes()[..]);

        let xpub = root.to_public();
        let parsed = ExtendedPublicKey::from_bytes(&xpub.to_bytes(), DerivationType::Peikert).unwrap();
        assert_eq!(parsed, xpub);
    }

    #[test]
    fn test_malformed_extended_keys_rejected() {
        assert!(ExtendedPrivateKey::from_bytes(&[0u8; 64], DerivationType::Peikert).is_err());
        let mut bytes = [0u8; XPRV_SIZE];
        bytes[0] = 0x01;
        assert!(ExtendedPrivateKey::from_bytes(&bytes, DerivationType::Peikert).is_err());
        assert!(ExtendedPublicKey::from_bytes(&[0u8; 32], DerivationType::Peikert).is_err());
    }

    #[test]
    fn test_truncate_high_bits() {
        let mut bytes = [0xFFu8; 32];
        truncate_high_bits(&mut bytes, 9);
        assert_eq!(bytes[31], 0);
        assert_eq!(bytes[30], 0x7F);
        assert_eq!(bytes[29], 0xFF);

        let mut bytes = [0xFFu8; 32];
        truncate_high_bits(&mut bytes, 32);
        assert_eq!(&bytes[28..], &[0, 0, 0, 0]);
        assert_eq!(bytes[27], 0xFF);
    }

    #[test]
    fn test_add_mul8_overflow() {
        let mut x = [0u8; 32];
        x[31] = 0xF0;
        let mut y = [0u8; 32];
        y[31] = 0x10;
        assert!(add_mul8(&x, &y).is_none());

        let mut y = [0u8; 32];
        y[0] = 1;
        let out = add_mul8(&[0u8; 32], &y).unwrap();
        assert_eq!(out[0], 8);
    }
}
