//! Entropy, mnemonic phrase and seed handling
//!
//! A wallet is created from 256 bits of entropy. The entropy is the only
//! secret that is ever persisted; the 24-word BIP-39 phrase and the 64-byte
//! seed are recomputed from it on demand.

use std::fmt;

use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

/// Entropy length in bytes (256 bits, 24 words)
pub const ENTROPY_SIZE: usize = 32;

/// BIP-39 seed length in bytes
pub const SEED_SIZE: usize = 64;

/// Number of words in a phrase encoding [`ENTROPY_SIZE`] bytes
pub const WORD_COUNT: usize = 24;

/// 256 bits of wallet entropy.
///
/// Only 32-byte buffers can be turned into an `Entropy`, so every value of
/// this type has a valid mnemonic encoding.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entropy([u8; ENTROPY_SIZE]);

impl Entropy {
    /// Generate fresh entropy from the operating system's secure random source
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; ENTROPY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::EntropyGeneration(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; ENTROPY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw entropy bytes
    pub fn as_bytes(&self) -> &[u8; ENTROPY_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Entropy {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; ENTROPY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidEntropy { len: bytes.len() })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Entropy(..)")
    }
}

/// A 24-word English BIP-39 phrase
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic(bip39::Mnemonic);

impl Mnemonic {
    /// Encode entropy as a phrase. Cannot fail: the entropy length is fixed.
    pub fn from_entropy(entropy: &Entropy) -> Self {
        // 32 bytes is always a valid BIP-39 entropy length
        match bip39::Mnemonic::from_entropy(entropy.as_bytes()) {
            Ok(mnemonic) => Self(mnemonic),
            Err(e) => unreachable!("256-bit entropy rejected by bip39: {}", e),
        }
    }

    /// Parse a user supplied phrase.
    ///
    /// Surrounding and repeated whitespace and upper-case letters are
    /// tolerated. Unknown words, a word count other than 24 or a checksum
    /// mismatch are reported as [`Error::InvalidMnemonic`]; nothing is ever
    /// auto-corrected.
    pub fn parse(phrase: &str) -> Result<Self> {
        let normalized = Zeroizing::new(
            phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );

        let word_count = normalized.split(' ').filter(|w| !w.is_empty()).count();
        if word_count != WORD_COUNT {
            return Err(Error::InvalidMnemonic(format!(
                "expected {} words, got {}",
                WORD_COUNT, word_count
            )));
        }

        let mnemonic = bip39::Mnemonic::parse_in_normalized(bip39::Language::English, &normalized)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;

        Ok(Self(mnemonic))
    }

    /// Recover the entropy encoded by this phrase
    pub fn to_entropy(&self) -> Result<Entropy> {
        let entropy = Zeroizing::new(self.0.to_entropy());
        Entropy::try_from(entropy.as_slice())
    }

    /// Derive the BIP-39 seed (PBKDF2-HMAC-SHA512, 2048 rounds)
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        Seed(Zeroizing::new(self.0.to_seed(passphrase)))
    }

    /// The phrase as space separated words
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.0.to_string())
    }

    pub fn word_count(&self) -> usize {
        self.0.word_count()
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.word_count())
    }
}

/// BIP-39 seed. Transient; recomputed from entropy whenever it is needed.
pub struct Seed(Zeroizing<[u8; SEED_SIZE]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes()[..] == other.as_bytes()[..]
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Parse a phrase and return the entropy it encodes
pub fn entropy_from_mnemonic(phrase: &str) -> Result<Entropy> {
    Mnemonic::parse(phrase)?.to_entropy()
}

/// Seed for stored entropy with the empty passphrase
pub fn seed_from_entropy(entropy: &Entropy) -> Seed {
    Mnemonic::from_entropy(entropy).to_seed("")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ENTROPY_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn test_generate_entropy() {
        let a = Entropy::generate().unwrap();
        let b = Entropy::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entropy_length_rejected() {
        for len in [0usize, 16, 31, 33, 64] {
            let bytes = vec![7u8; len];
            match Entropy::try_from(bytes.as_slice()) {
                Err(Error::InvalidEntropy { len: got }) => assert_eq!(got, len),
                other => panic!("expected InvalidEntropy for {} bytes, got {:?}", len, other),
            }
        }
        assert!(Entropy::try_from([7u8; 32].as_slice()).is_ok());
    }

    #[test]
    fn test_zero_entropy_phrase() {
        let mnemonic = Mnemonic::from_entropy(&Entropy::from_bytes([0u8; 32]));
        assert_eq!(mnemonic.phrase().as_str(), ZERO_ENTROPY_PHRASE);
        assert_eq!(mnemonic.word_count(), 24);
    }

    #[test]
    fn test_zero_entropy_seed() {
        let seed = seed_from_entropy(&Entropy::from_bytes([0u8; 32]));
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "408b285c123836004f4b8842c89324c1f01382450c0d439af345ba7fc49acf705489c6fc77dbd4e3dc1dd8cc6bc9f043db8ada1e243c4a0eafb290d399480840"
        );
    }

    #[test]
    fn test_parse_normalizes_whitespace_and_case() {
        let messy = format!("  {}  ", ZERO_ENTROPY_PHRASE.to_uppercase().replace(' ', "   "));
        let entropy = entropy_from_mnemonic(&messy).unwrap();
        assert_eq!(entropy.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        // same entropy bits in the last word, checksum bits 0x03 instead of 0x66
        let bad = ZERO_ENTROPY_PHRASE.replace(" art", " about");
        assert!(matches!(Mnemonic::parse(&bad), Err(Error::InvalidMnemonic(_))));
    }

    #[test]
    fn test_unknown_word_rejected() {
        let bad = ZERO_ENTROPY_PHRASE.replacen("abandon", "abandonn", 1);
        assert!(matches!(Mnemonic::parse(&bad), Err(Error::InvalidMnemonic(_))));
    }

    #[test]
    fn test_word_count_rejected() {
        let twelve = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(matches!(Mnemonic::parse(twelve), Err(Error::InvalidMnemonic(_))));
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let mnemonic = Mnemonic::parse(ZERO_ENTROPY_PHRASE).unwrap();
        assert_ne!(mnemonic.to_seed(""), mnemonic.to_seed("TREZOR"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let entropy = Entropy::from_bytes([0xAB; 32]);
        assert_eq!(format!("{:?}", entropy), "Entropy(..)");
        let seed = seed_from_entropy(&entropy);
        assert_eq!(format!("{:?}", seed), "Seed(..)");
    }
}
