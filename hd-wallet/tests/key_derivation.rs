//! Tests for BIP32-Ed25519 key derivation

use hd_wallet::crypto::keys::*;
use hd_wallet::crypto::mnemonic::*;
use hd_wallet::Error;

const H: u32 = HARDENED_OFFSET;

fn zero_seed() -> Seed {
    seed_from_entropy(&Entropy::from_bytes([0u8; 32]))
}

fn public_key_at(path: &KeyPath) -> String {
    let key = DerivationEngine::derive_key_from_seed(
        zero_seed().as_bytes(),
        &path.segments().unwrap(),
        false,
        path.derivation_type,
    )
    .unwrap();
    hex::encode(key.public_key())
}

#[test]
fn test_root_key_vector() {
    let root = ExtendedPrivateKey::from_seed(zero_seed().as_bytes(), DerivationType::Peikert).unwrap();
    let bytes = root.to_bytes();

    assert!(hex::encode(&bytes[..32]).starts_with("e05a501c"));
    assert!(hex::encode(&bytes[..32]).ends_with("b64747"));
    assert!(hex::encode(&bytes[32..64]).starts_with("d1232d10"));
    assert!(hex::encode(&bytes[64..]).starts_with("12de8708"));
    assert_eq!(root.depth(), 0);
}

#[test]
fn test_known_answer_vectors() {
    let cases = [
        (KeyPurpose::Address, DerivationType::Peikert, "46226393edc4f31c3cc52b6af3fe75166b05c0aad213dfdba9736679f039260f"),
        (KeyPurpose::Identity, DerivationType::Peikert, "8c21d5fb97813e287b939a548126917c1cbce5f2fa81eb9d64b03ca412066a17"),
        (KeyPurpose::Address, DerivationType::Khovratovich, "c24accc2ce6116c4262242b1e2d5c586afddc4293e57a298e5f439407eb0bc4a"),
        (KeyPurpose::Identity, DerivationType::Khovratovich, "97cf74d74290149289ef6118c62a33281b863e69a2f9c0da7b035a1e3b5fce2f"),
    ];

    for (purpose, derivation_type, expected) in cases {
        let path = KeyPath::new(purpose, 0, 0, 0, derivation_type);
        assert_eq!(public_key_at(&path), expected, "{} {}", derivation_type, path);
    }
}

#[test]
fn test_derivation_is_deterministic() {
    let path = KeyPath::address(3, 7, DerivationType::Peikert);
    assert_eq!(public_key_at(&path), public_key_at(&path));
}

#[test]
fn test_derivation_types_diverge() {
    for (account, key_index) in [(0, 0), (0, 1), (1, 0), (5, 9)] {
        let peikert = KeyPath::address(account, key_index, DerivationType::Peikert);
        let khovratovich = peikert.with_derivation_type(DerivationType::Khovratovich);
        assert_ne!(public_key_at(&peikert), public_key_at(&khovratovich));
    }
}

#[test]
fn test_distinct_paths_give_distinct_keys() {
    let paths = [
        KeyPath::address(0, 0, DerivationType::Peikert),
        KeyPath::address(0, 1, DerivationType::Peikert),
        KeyPath::address(1, 0, DerivationType::Peikert),
        KeyPath::new(KeyPurpose::Address, 0, 1, 0, DerivationType::Peikert),
        KeyPath::new(KeyPurpose::Identity, 0, 0, 0, DerivationType::Peikert),
    ];
    let keys: std::collections::HashSet<String> = paths.iter().map(public_key_at).collect();
    assert_eq!(keys.len(), paths.len());
}

#[test]
fn test_public_derivation_matches_private() {
    for derivation_type in [DerivationType::Peikert, DerivationType::Khovratovich] {
        let chain = DerivationEngine::derive_key_from_seed(
            zero_seed().as_bytes(),
            &[44 | H, 283 | H, H, 0],
            true,
            derivation_type,
        )
        .unwrap();
        let public_chain = ExtendedKey::Public(chain.clone().into_private().unwrap().to_public());

        for index in [0, 1, 42, H - 1] {
            let private_child = DerivationEngine::derive_child(&chain, index, derivation_type).unwrap();
            let public_child = DerivationEngine::derive_child(&public_chain, index, derivation_type).unwrap();

            assert!(private_child.is_private());
            assert!(!public_child.is_private());
            assert_eq!(private_child.public_key(), public_child.public_key());
            assert_eq!(private_child.chain_code(), public_child.chain_code());
            assert_eq!(public_child.depth(), 5);
        }
    }
}

#[test]
fn test_hardened_public_derivation_fails() {
    let chain = DerivationEngine::derive_key_from_seed(zero_seed().as_bytes(), &[44 | H], false, DerivationType::Peikert)
        .unwrap();
    let err = DerivationEngine::derive_child(&chain, H, DerivationType::Peikert).unwrap_err();
    assert!(matches!(err, Error::DerivationFailed(_)));
}

#[test]
fn test_extended_key_serialization() {
    let key = DerivationEngine::derive_key_from_seed(zero_seed().as_bytes(), &[44 | H, 283 | H], true, DerivationType::Peikert)
        .unwrap()
        .into_private()
        .unwrap();

    let bytes = key.to_bytes();
    assert_eq!(bytes.len(), XPRV_SIZE);
    let restored = ExtendedPrivateKey::from_bytes(&bytes[..], DerivationType::Peikert).unwrap();
    assert_eq!(restored.public_key(), key.public_key());

    let xpub = key.to_public().to_bytes();
    assert_eq!(xpub.len(), XPUB_SIZE);
    let public = ExtendedPublicKey::from_bytes(&xpub, DerivationType::Peikert).unwrap();
    assert_eq!(public.public_key(), &key.public_key());
}

#[test]
fn test_short_seed_is_rejected() {
    let err = ExtendedPrivateKey::from_seed(&[0u8; 8], DerivationType::Peikert).unwrap_err();
    assert!(matches!(err, Error::DerivationFailed(_)));
}
