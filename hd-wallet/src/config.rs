//! Engine configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::derivation::DerivationType;
use crate::error::{Error, Result};

/// Default number of consecutive inactive accounts/keys scanned before recovery stops
pub const DEFAULT_GAP_LIMIT: u32 = 5;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Derivation type used when a caller does not pick one
    pub default_derivation_type: DerivationType,
    /// Recovery gap limit
    pub gap_limit: u32,
    /// Directory for [`FileWalletStore`](crate::account::FileWalletStore), if used
    pub store_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_derivation_type: DerivationType::default(),
            gap_limit: DEFAULT_GAP_LIMIT,
            store_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from `HD_WALLET_*` environment variables.
    /// Unset variables keep their defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("HD_WALLET_DERIVATION_TYPE") {
            config.default_derivation_type = value
                .parse()
                .map_err(|_| Error::Config(format!("HD_WALLET_DERIVATION_TYPE: unknown derivation type {:?}", value)))?;
        }

        if let Some(value) = lookup("HD_WALLET_GAP_LIMIT") {
            config.gap_limit = value
                .parse()
                .map_err(|_| Error::Config(format!("HD_WALLET_GAP_LIMIT: not a number: {:?}", value)))?;
            if config.gap_limit == 0 {
                return Err(Error::Config("HD_WALLET_GAP_LIMIT must be at least 1".to_string()));
            }
        }

        if let Some(value) = lookup("HD_WALLET_STORE_DIR") {
            config.store_dir = Some(PathBuf::from(value));
        }

        if let Some(value) = lookup("HD_WALLET_LOG") {
            config.log_level = value;
        }

        Ok(config)
    }
}
