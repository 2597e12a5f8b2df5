//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},hyper=warn,reqwest=warn", config.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format.as_str() {
        "json" => builder
            .json()
            .try_init()
            .map_err(|e| anyhow!("Failed to install json subscriber: {e}"))?,
        _ => builder
            .pretty()
            .try_init()
            .map_err(|e| anyhow!("Failed to install subscriber: {e}"))?,
    }

    tracing::debug!(level = %config.level, format = %config.format, "logging initialized");
    Ok(())
}
