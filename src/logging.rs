//! Logging setup
//!
//! Installs a `tracing` subscriber. `RUST_LOG` takes precedence over the
//! default filter passed in.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| Error::Config(format!("invalid log filter '{}': {}", default_filter, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))
}
