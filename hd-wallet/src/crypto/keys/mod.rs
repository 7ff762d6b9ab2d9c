//! Key derivation and management
//!
//! This module provides BIP32-Ed25519 derivation under the two supported
//! derivation types, BIP-44 key paths and the Ed25519 primitives used by the
//! signer.

pub mod derivation;
pub mod ed25519;
pub mod path;

pub use derivation::*;
pub use path::*;
