//! Builder pattern for ArbitrageEngine

use super::Registries;
use crate::config::{WatcherConfig, MAX_PROFIT_BPS};
use crate::engine::{ArbitrageEngine, ArbitrageOpportunity};
use crate::errors::{ConfigError, Result};
use tokio::sync::mpsc;

/// Builder for creating ArbitrageEngine instances with a fluent API
pub struct EngineBuilder {
    registries: Registries,
    min_profit_bps: u32,
    reporter: Option<mpsc::UnboundedSender<ArbitrageOpportunity>>,
}

impl EngineBuilder {
    /// Create an EngineBuilder over populated registries
    pub fn new(registries: Registries) -> Self {
        Self {
            registries,
            min_profit_bps: 0,
            reporter: None,
        }
    }

    /// Create an EngineBuilder using the thresholds of a WatcherConfig
    pub fn from_config(registries: Registries, config: &WatcherConfig) -> Self {
        Self::new(registries).min_profit_bps(config.min_profit_bps)
    }

    /// Minimum profit, in basis points, a cycle must strictly exceed
    pub fn min_profit_bps(mut self, min_profit_bps: u32) -> Self {
        self.min_profit_bps = min_profit_bps;
        self
    }

    /// Forward every detected opportunity to a channel
    pub fn reporter(mut self, reporter: mpsc::UnboundedSender<ArbitrageOpportunity>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Build the ArbitrageEngine
    ///
    /// # Errors
    ///
    /// Returns an error if the minimum profit exceeds 100%.
    pub fn build(self) -> Result<ArbitrageEngine> {
        if self.min_profit_bps > MAX_PROFIT_BPS {
            return Err(ConfigError::InvalidValue {
                name: "min_profit_bps".to_string(),
                message: format!("must be <= {}, got {}", MAX_PROFIT_BPS, self.min_profit_bps),
            }
            .into());
        }

        let engine = ArbitrageEngine::new(self.registries.tokens, self.registries.pools, self.min_profit_bps);
        Ok(match self.reporter {
            Some(reporter) => engine.with_reporter(reporter),
            None => engine,
        })
    }
}
