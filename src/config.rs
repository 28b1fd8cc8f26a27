//! Configuration management
//! Load settings from .env file / environment variables

use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Process-level defaults for a monitoring session. These become part of an
/// explicit `PaymentCriteria` per session — no global mutable state, so
/// concurrent sessions stay independent.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub rpc_url: String,
    pub recipient_address: String,
    pub expected_amount_eth: Decimal,
    pub max_blocks_to_wait: u64,
    pub confirmations: u64,
    pub poll_interval_ms: u64,
}

pub fn load_config() -> Result<WatchConfig> {
    dotenv::dotenv().ok();

    Ok(WatchConfig {
        rpc_url: std::env::var("RPC_URL").context("RPC_URL not set")?,
        recipient_address: std::env::var("RECIPIENT_ADDRESS")
            .context("RECIPIENT_ADDRESS not set")?,
        expected_amount_eth: env_or("EXPECTED_AMOUNT_ETH", "0.01")?,
        max_blocks_to_wait: env_or("MAX_BLOCKS_TO_WAIT", "50")?,
        confirmations: env_or("CONFIRMATIONS", "3")?,
        poll_interval_ms: env_or("POLL_INTERVAL_MS", "5000")?,
    })
}

/// Read an env var with a fallback default, parsed into the target type.
fn env_or<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("{} is not a valid value", key))
}
