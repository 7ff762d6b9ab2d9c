//! Wallet accounts
//!
//! Wallet records and their storage backends, key resolution from stored
//! entropy, and the wallet lifecycle service built on top of both.

mod file_store;
mod resolver;
mod store;
mod wallet;

pub use file_store::*;
pub use resolver::*;
pub use store::*;
pub use wallet::*;
