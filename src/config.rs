//! Configuration management for the arbitrage watcher.
//!
//! Two inputs drive a run:
//!
//! - `WatcherConfig`: node endpoint, profit threshold and runtime knobs, loaded
//!   from the environment (or assembled by the CLI) and validated up front.
//! - `MarketConfig`: the tokens and pools to watch, read from a JSON market file.
//!
//! Every check happens before the first subscription is opened, so a bad value
//! is a startup failure rather than a surprise mid-run.

use crate::errors::{ConfigError, Result};
use crate::registry::Venue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default delay between two pool subscriptions at startup.
pub const DEFAULT_SUBSCRIBE_DELAY_MS: u64 = 500;

/// Default label for the node in logs.
pub const DEFAULT_NODE_NAME: &str = "polygon";

/// Default market file location.
pub const DEFAULT_MARKETS_PATH: &str = "markets/polygon.json";

/// Upper bound on the minimum profit (100%).
pub const MAX_PROFIT_BPS: u32 = 10_000;

/// Runtime settings for one watcher process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// WebSocket endpoint of the node (`ws://` or `wss://`)
    pub node_url: String,
    /// Label for the node in logs
    pub node_name: String,
    /// JSON market file with the tokens and pools to watch
    pub markets_path: PathBuf,
    /// Minimum profit a cycle must exceed, in basis points
    pub min_profit_bps: u32,
    /// Pause between consecutive pool subscriptions
    pub subscribe_delay: Duration,
    /// Directory for the timestamped log file; stdout only when unset
    pub log_dir: Option<PathBuf>,
}

impl WatcherConfig {
    /// Create a validated configuration with default knobs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the node URL is not a WebSocket URL.
    pub fn new(node_url: impl Into<String>, markets_path: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            node_url: node_url.into(),
            node_name: DEFAULT_NODE_NAME.to_string(),
            markets_path: markets_path.into(),
            min_profit_bps: 0,
            subscribe_delay: Duration::from_millis(DEFAULT_SUBSCRIBE_DELAY_MS),
            log_dir: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    pub fn with_min_profit_bps(mut self, min_profit_bps: u32) -> Self {
        self.min_profit_bps = min_profit_bps;
        self
    }

    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = delay;
        self
    }

    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }

    /// Load the configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `ARB_NODE_URL`: WebSocket endpoint of the node
    ///
    /// ## Optional
    /// - `ARB_NODE_NAME`: node label for logs (default: polygon)
    /// - `ARB_MARKETS_PATH`: market file (default: markets/polygon.json)
    /// - `ARB_MIN_PROFIT_BPS`: minimum profit in BPS, at most 10000 (default: 0)
    /// - `ARB_SUBSCRIBE_DELAY_MS`: delay between subscriptions (default: 500)
    /// - `ARB_LOG_DIR`: directory for the log file (default: none)
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::info!("Loading watcher configuration from environment");

        let node_url = lookup("ARB_NODE_URL").ok_or_else(|| ConfigError::Missing {
            name: "ARB_NODE_URL".to_string(),
        })?;
        let markets_path = lookup("ARB_MARKETS_PATH").unwrap_or_else(|| DEFAULT_MARKETS_PATH.to_string());

        let mut config = Self::new(node_url, markets_path)?;

        if let Some(node_name) = lookup("ARB_NODE_NAME") {
            config.node_name = node_name;
        }
        if let Some(raw) = lookup("ARB_MIN_PROFIT_BPS") {
            config.min_profit_bps = parse_number("ARB_MIN_PROFIT_BPS", &raw)?;
        }
        if let Some(raw) = lookup("ARB_SUBSCRIBE_DELAY_MS") {
            config.subscribe_delay = Duration::from_millis(parse_number("ARB_SUBSCRIBE_DELAY_MS", &raw)?);
        }
        config.log_dir = lookup("ARB_LOG_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from);

        config.validate()?;

        tracing::info!(
            node = %config.node_name,
            markets = %config.markets_path.display(),
            min_profit_bps = config.min_profit_bps,
            subscribe_delay_ms = config.subscribe_delay.as_millis() as u64,
            "Watcher configuration loaded"
        );
        Ok(config)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.node_url).map_err(|e| ConfigError::InvalidValue {
            name: "node_url".to_string(),
            message: format!("{}: {}", self.node_url, e),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                name: "node_url".to_string(),
                message: format!("expected a ws:// or wss:// URL, got {}", self.node_url),
            }
            .into());
        }

        if self.node_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "node_name".to_string(),
                message: "cannot be empty".to_string(),
            }
            .into());
        }

        if self.min_profit_bps > MAX_PROFIT_BPS {
            return Err(ConfigError::InvalidValue {
                name: "min_profit_bps".to_string(),
                message: format!("must be <= {} (100%), got {}", MAX_PROFIT_BPS, self.min_profit_bps),
            }
            .into());
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("{} is not a valid non-negative integer", raw),
        }
        .into()
    })
}

/// A token entry of the market file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    #[serde(default)]
    pub holdable: bool,
}

/// A pool entry of the market file; tokens are referenced by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub address: String,
    pub venue: Venue,
    /// Fee in venue-native units (500 = 0.05%)
    pub fee: u32,
    pub token0: String,
    pub token1: String,
}

/// Tokens and pools to watch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    pub tokens: Vec<TokenConfig>,
    pub pools: Vec<PoolConfig>,
}

impl MarketConfig {
    /// Read and validate a JSON market file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, a serialization error
    /// if it is not valid JSON, or `InvalidMarkets` if it fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading market file");

        let raw = std::fs::read_to_string(path)?;
        let markets = Self::from_json(&raw)?;

        tracing::info!(
            tokens = markets.tokens.len(),
            pools = markets.pools.len(),
            "Market file loaded"
        );
        Ok(markets)
    }

    /// Parse and validate a market description.
    pub fn from_json(raw: &str) -> Result<Self> {
        let markets: Self = serde_json::from_str(raw)?;
        markets.validate()?;
        Ok(markets)
    }

    /// Structural checks that do not need the registries.
    ///
    /// Duplicate and dangling keys are left to the registry builder, which
    /// reports them with the registry's own error types.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(invalid_markets("no tokens configured"));
        }
        if self.pools.is_empty() {
            return Err(invalid_markets("no pools configured"));
        }

        for pool in &self.pools {
            if pool.token0 == pool.token1 {
                return Err(invalid_markets(format!(
                    "pool {} pairs {} with itself",
                    pool.address, pool.token0
                )));
            }
        }

        Ok(())
    }

    /// Venues referenced by at least one pool.
    pub fn venues(&self) -> HashSet<Venue> {
        self.pools.iter().map(|pool| pool.venue).collect()
    }
}

fn invalid_markets(message: impl Into<String>) -> crate::errors::ArbitrageError {
    ConfigError::InvalidMarkets { message: message.into() }.into()
}
