//! Transaction and data signing
//!
//! Ed25519 signing with wallet-derived keys, signature verification and
//! ECDH shared-secret agreement.

mod ecdh;
pub mod signer;
pub mod types;

pub use signer::*;
pub use types::*;
