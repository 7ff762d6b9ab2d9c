//! ECDH key agreement between two wallet keys
//!
//! Both parties map their Ed25519 keys to X25519, multiply the peer's point by
//! their own derived scalar and hash the result together with both public
//! keys: `BLAKE2b-256(shared || first || second)`. `me_first` picks the order
//! of the public keys, so the two sides must pass opposite values to agree.

use blake2b_simd::Params;

use super::types::SharedSecret;
use crate::crypto::keys::derivation::ExtendedPrivateKey;
use crate::crypto::keys::ed25519::{self, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};

const SHARED_SECRET_SIZE: usize = 32;

pub(crate) fn agree(
    key: &ExtendedPrivateKey,
    other_public_key: &[u8],
    me_first: bool,
) -> Result<SharedSecret> {
    let other_public_key = <[u8; PUBLIC_KEY_SIZE]>::try_from(other_public_key).map_err(|_| {
        Error::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_SIZE,
            other_public_key.len()
        ))
    })?;

    let own_x25519 = ed25519::to_x25519(&key.public_key())?;
    let other_x25519 = ed25519::to_x25519(&other_public_key)?;
    let shared = ed25519::scalar_mult_x25519(key.scalar_bytes(), &other_public_key)?;

    let (first, second) = if me_first {
        (&own_x25519, &other_x25519)
    } else {
        (&other_x25519, &own_x25519)
    };

    let mut state = Params::new().hash_length(SHARED_SECRET_SIZE).to_state();
    state.update(&shared[..]);
    state.update(first);
    state.update(second);
    let hash = state.finalize();

    let mut secret = [0u8; SHARED_SECRET_SIZE];
    secret.copy_from_slice(hash.as_bytes());
    Ok(SharedSecret::from_bytes(secret))
}
