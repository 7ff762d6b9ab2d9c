//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `config.log_level`. Returns `Ok(false)` if a global subscriber was
/// already installed, so it is safe to call more than once.
pub fn init_tracing(config: &EngineConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| Error::Config(format!("invalid log level {:?}: {}", config.log_level, e)))?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
