//! Tracing setup shared by the binaries.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over
/// `default_filter` when it is set and parses.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|err| anyhow!("invalid log filter {default_filter:?}: {err}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("installing tracing subscriber: {err}"))
}
