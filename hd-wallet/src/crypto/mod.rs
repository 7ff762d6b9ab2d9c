//! Cryptographic primitives and operations
//!
//! This module provides the entropy/mnemonic/seed codec, hierarchical key
//! derivation and the Ed25519 operations required for wallet management.

pub mod mnemonic;
pub mod keys;

pub use mnemonic::*;
pub use keys::*;
