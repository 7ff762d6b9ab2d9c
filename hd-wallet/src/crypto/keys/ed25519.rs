//! Ed25519 primitives over BIP32-Ed25519 extended keys
//!
//! Derived scalars are not clamped after the root, so the usual
//! seed-expanding Ed25519 signing key types cannot be used. Signing and key
//! agreement work directly on the scalar; verification is plain Ed25519.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, VerifyingKey};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, Zeroizing};

use super::derivation::ExtendedPrivateKey;
use crate::error::{Error, Result};

pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;

/// `scalar·B` without clamping the scalar
pub fn public_key_from_scalar(scalar: &[u8; 32]) -> [u8; PUBLIC_KEY_SIZE] {
    let mut a = Scalar::from_bytes_mod_order(*scalar);
    let public_key = EdwardsPoint::mul_base(&a).compress().to_bytes();
    a.zeroize();
    public_key
}

/// Decode a compressed Edwards point
pub fn decompress(public_key: &[u8; PUBLIC_KEY_SIZE]) -> Result<EdwardsPoint> {
    CompressedEdwardsY(*public_key)
        .decompress()
        .ok_or_else(|| Error::InvalidPublicKey("not a valid Ed25519 point".to_string()))
}

/// `A + tweak·B`
pub(crate) fn add_base_multiple(public_key: &[u8; PUBLIC_KEY_SIZE], tweak: &[u8; 32]) -> Result<[u8; PUBLIC_KEY_SIZE]> {
    let point = decompress(public_key)?;
    let tweak = Scalar::from_bytes_mod_order(*tweak);
    Ok((point + EdwardsPoint::mul_base(&tweak)).compress().to_bytes())
}

/// Sign `message` with an extended private key.
///
/// `r = SHA512(kR || M)`, `R = r·B`, `S = r + SHA512(R || A || M)·kL`,
/// all scalars reduced mod ℓ.
pub fn sign(key: &ExtendedPrivateKey, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
    let mut a = Scalar::from_bytes_mod_order(*key.scalar_bytes());
    let public_key = EdwardsPoint::mul_base(&a).compress();

    let mut wide = Zeroizing::new([0u8; 64]);
    wide.copy_from_slice(&Sha512::new().chain_update(key.nonce_prefix()).chain_update(message).finalize());
    let mut r = Scalar::from_bytes_mod_order_wide(&wide);
    let big_r = EdwardsPoint::mul_base(&r).compress();

    wide.copy_from_slice(
        &Sha512::new()
            .chain_update(big_r.as_bytes())
            .chain_update(public_key.as_bytes())
            .chain_update(message)
            .finalize(),
    );
    let k = Scalar::from_bytes_mod_order_wide(&wide);
    let s = r + k * a;

    a.zeroize();
    r.zeroize();

    let mut signature = [0u8; SIGNATURE_SIZE];
    signature[..32].copy_from_slice(big_r.as_bytes());
    signature[32..].copy_from_slice(s.as_bytes());
    signature
}

/// Strict Ed25519 verification. Malformed inputs verify as `false`.
pub fn verify(signature: &[u8], message: &[u8], public_key: &[u8]) -> bool {
    let Ok(public_key) = <[u8; PUBLIC_KEY_SIZE]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify_strict(message, &signature).is_ok()
}

/// Birational map of an Ed25519 public key to its X25519 form.
/// Small-order points are rejected.
pub fn to_x25519(public_key: &[u8; PUBLIC_KEY_SIZE]) -> Result<[u8; 32]> {
    let point = decompress(public_key)?;
    if point.is_small_order() {
        return Err(Error::InvalidPublicKey("small order point".to_string()));
    }
    Ok(point.to_montgomery().to_bytes())
}

/// X25519 point `scalar·P` where `P` is the peer's Ed25519 key mapped to
/// Montgomery form. The scalar is used as derived (unclamped), so both
/// sides of an agreement compute the same point.
pub fn scalar_mult_x25519(scalar: &[u8; 32], peer_public_key: &[u8; PUBLIC_KEY_SIZE]) -> Result<Zeroizing<[u8; 32]>> {
    let point = decompress(peer_public_key)?;
    if point.is_small_order() {
        return Err(Error::InvalidPublicKey("small order point".to_string()));
    }

    let mut a = Scalar::from_bytes_mod_order(*scalar);
    let shared = Zeroizing::new((&point.to_montgomery() * &a).to_bytes());
    a.zeroize();

    if shared.iter().all(|b| *b == 0) {
        return Err(Error::SigningFailed("key agreement produced the identity".to_string()));
    }
    Ok(shared)
}
