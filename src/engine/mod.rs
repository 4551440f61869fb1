//! The single consumer of the aggregation channel.
//!
//! For every normalized event the engine writes the new amounts into the pool
//! registry, snapshots the token set and the best-quote index, and scans every
//! triangular cycle. A scan completes before the next event is received, so a
//! slow scan back-pressures all adapters through the channel.

pub mod opportunity;
pub mod search;

pub use opportunity::{ArbitrageOpportunity, Leg};
pub use search::{find_opportunities, price_cycle, profit_threshold, PricedCycle, SearchStats};

use crate::dex::NormalizedEvent;
use crate::registry::{PoolRegistry, TokenRegistry};
use crate::RegistryResult;
use bigdecimal::BigDecimal;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Counters accumulated over an engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub events_received: u64,
    /// Events whose pool was not in the registry
    pub events_discarded: u64,
    pub scans: u64,
    pub opportunities: u64,
}

/// Triangular arbitrage detector over shared registries.
pub struct ArbitrageEngine {
    tokens: Arc<TokenRegistry>,
    pools: Arc<PoolRegistry>,
    threshold: BigDecimal,
    reporter: Option<mpsc::UnboundedSender<ArbitrageOpportunity>>,
}

impl ArbitrageEngine {
    /// Create an engine that reports cycles whose multiplier exceeds
    /// `1 + min_profit_bps / 10_000`.
    pub fn new(tokens: Arc<TokenRegistry>, pools: Arc<PoolRegistry>, min_profit_bps: u32) -> Self {
        Self {
            tokens,
            pools,
            threshold: profit_threshold(min_profit_bps),
            reporter: None,
        }
    }

    /// Also forward every detected opportunity to `reporter`.
    pub fn with_reporter(mut self, reporter: mpsc::UnboundedSender<ArbitrageOpportunity>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn threshold(&self) -> &BigDecimal {
        &self.threshold
    }

    /// Write an event's amounts into the pool registry.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound` if the event references an unknown pool.
    pub fn apply_event(&self, event: &NormalizedEvent) -> RegistryResult<()> {
        self.pools.update_amounts(
            &event.pool_address,
            event.amount_out_forward.clone(),
            event.amount_out_backward.clone(),
            event.block_number,
        )
    }

    /// Scan every ordered token triple against the current best quotes.
    pub fn scan(&self, block_number: u64) -> (Vec<ArbitrageOpportunity>, SearchStats) {
        let symbols = self.tokens.symbols();
        let quotes = self.pools.quote_book();
        find_opportunities(&symbols, &quotes, &self.threshold, block_number)
    }

    /// Apply one event and scan, returning the opportunities found.
    ///
    /// Unknown pools are logged and the event is discarded without a scan.
    pub fn process_event(&self, event: &NormalizedEvent) -> RegistryResult<Vec<ArbitrageOpportunity>> {
        tracing::info!(
            venue = %event.venue,
            pool = %event.pool_address,
            block = event.block_number,
            latency_ms = event.latency.num_milliseconds(),
            pair = %format!("{}/{}", event.token0_symbol, event.token1_symbol),
            fee = event.fee,
            forward = %event.amount_out_forward,
            backward = %event.amount_out_backward,
            "Swap event"
        );

        self.apply_event(event)?;

        let (opportunities, stats) = self.scan(event.block_number);
        tracing::debug!(
            block = event.block_number,
            triples = stats.triples,
            priced = stats.priced,
            profitable = stats.profitable,
            "Scan complete"
        );

        for opportunity in &opportunities {
            self.report(opportunity);
        }
        Ok(opportunities)
    }

    fn report(&self, opportunity: &ArbitrageOpportunity) {
        tracing::info!(
            id = %opportunity.id,
            block = opportunity.block_number,
            cycle = %opportunity,
            pools = ?opportunity.pools(),
            multiplier = %opportunity.multiplier,
            "Arbitrage opportunity"
        );

        if let Some(reporter) = &self.reporter {
            if reporter.send(opportunity.clone()).is_err() {
                tracing::debug!(id = %opportunity.id, "Opportunity receiver dropped");
            }
        }
    }

    /// Consume events until every sender is gone.
    ///
    /// Events still queued when shutdown begins are processed before returning.
    pub async fn run(self, mut events: mpsc::Receiver<NormalizedEvent>) -> EngineStats {
        let mut stats = EngineStats::default();
        tracing::info!(threshold = %self.threshold, "Arbitrage engine started");

        while let Some(event) = events.recv().await {
            stats.events_received += 1;
            match self.process_event(&event) {
                Ok(opportunities) => {
                    stats.scans += 1;
                    stats.opportunities += opportunities.len() as u64;
                }
                Err(e) => {
                    stats.events_discarded += 1;
                    tracing::warn!(pool = %event.pool_address, error = %e, "Discarding event");
                }
            }
        }

        tracing::info!(
            events = stats.events_received,
            discarded = stats.events_discarded,
            opportunities = stats.opportunities,
            "Arbitrage engine stopped"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RegistryError;
    use crate::registry::{Pool, Token, Venue};
    use alloy::primitives::Address;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    struct Market {
        tokens: Arc<TokenRegistry>,
        pools: Arc<PoolRegistry>,
    }

    const AB: u8 = 0xab;
    const BC: u8 = 0xbc;
    const CA: u8 = 0xca;

    fn market() -> Market {
        let tokens = Arc::new(TokenRegistry::new());
        let pools = Arc::new(PoolRegistry::new());
        let a = Token::new("A", Address::repeat_byte(1), 18, true);
        let b = Token::new("B", Address::repeat_byte(2), 18, true);
        let c = Token::new("C", Address::repeat_byte(3), 18, true);

        for (byte, t0, t1) in [(AB, &a, &b), (BC, &b, &c), (CA, &c, &a)] {
            pools
                .insert(Pool::new(Address::repeat_byte(byte), Venue::UniswapV3, 500, t0.key(), t1.key()))
                .unwrap();
        }
        for token in [a, b, c] {
            tokens.insert(token).unwrap();
        }
        Market { tokens, pools }
    }

    fn event(pool: u8, forward: &str, backward: &str, block: u64) -> NormalizedEvent {
        let (token0, token1) = match pool {
            AB => ("A", "B"),
            BC => ("B", "C"),
            _ => ("C", "A"),
        };
        NormalizedEvent {
            venue: Venue::UniswapV3,
            pool_address: Address::repeat_byte(pool),
            block_number: block,
            latency: chrono::Duration::milliseconds(1200),
            fee: 500,
            token0_symbol: token0.to_string(),
            token1_symbol: token1.to_string(),
            amount_out_forward: dec(forward),
            amount_out_backward: dec(backward),
        }
    }

    fn for_cycle<'a>(found: &'a [ArbitrageOpportunity], cycle: [&str; 3]) -> Vec<&'a ArbitrageOpportunity> {
        found.iter().filter(|o| o.tokens == cycle.map(String::from)).collect()
    }

    #[test]
    fn test_profitable_cycle_reported_once() {
        let market = market();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 0);

        assert!(engine.process_event(&event(BC, "1", "1", 10)).unwrap().is_empty());
        assert!(engine.process_event(&event(CA, "1", "1", 10)).unwrap().is_empty());
        let found = engine.process_event(&event(AB, "1.02", "0.98", 11)).unwrap();

        let abc = for_cycle(&found, ["A", "B", "C"]);
        assert_eq!(abc.len(), 1);
        let diff = (&abc[0].multiplier - dec("1.02")).abs();
        assert!(diff < dec("1e-9"));
        assert_eq!(abc[0].block_number, 11);
        assert_eq!(abc[0].pools(), [Address::repeat_byte(AB), Address::repeat_byte(BC), Address::repeat_byte(CA)]);

        // Reverse direction compounds 0.98 and stays below one
        assert!(for_cycle(&found, ["A", "C", "B"]).is_empty());
    }

    #[test]
    fn test_unprofitable_cycle_not_reported() {
        let market = market();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 0);

        engine.process_event(&event(BC, "1", "1", 10)).unwrap();
        engine.process_event(&event(CA, "1", "1", 10)).unwrap();
        let found = engine.process_event(&event(AB, "0.99", "1", 11)).unwrap();

        assert!(for_cycle(&found, ["A", "B", "C"]).is_empty());
        // All legs at exactly 1 in the other direction: not strictly above threshold
        assert!(found.is_empty());
    }

    #[test]
    fn test_unset_legs_are_skipped() {
        let market = market();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 0);

        assert!(engine.process_event(&event(AB, "2", "2", 10)).unwrap().is_empty());
        assert!(engine.process_event(&event(BC, "2", "2", 10)).unwrap().is_empty());
        let (_, stats) = engine.scan(10);
        assert_eq!(stats.triples, 6);
        assert_eq!(stats.priced, 0);
    }

    #[test]
    fn test_min_profit_threshold() {
        let market = market();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 300);
        assert_eq!(engine.threshold(), &dec("1.03"));

        engine.process_event(&event(BC, "1", "1", 10)).unwrap();
        engine.process_event(&event(CA, "1", "1", 10)).unwrap();
        assert!(engine.process_event(&event(AB, "1.02", "0.98", 11)).unwrap().is_empty());
        assert_eq!(engine.process_event(&event(AB, "1.05", "0.95", 12)).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_pool_is_an_error() {
        let market = market();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 0);

        let err = engine.process_event(&event(0x99, "1", "1", 10)).unwrap_err();
        assert!(matches!(err, RegistryError::PoolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_drains_channel_and_reports() {
        let market = market();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let engine = ArbitrageEngine::new(market.tokens.clone(), market.pools.clone(), 0).with_reporter(report_tx);

        let (tx, rx) = mpsc::channel(1);
        let producer = tokio::spawn(async move {
            for e in [
                event(BC, "1", "1", 10),
                event(0x99, "1", "1", 10),
                event(CA, "1", "1", 10),
                event(AB, "1.02", "0.98", 11),
            ] {
                tx.send(e).await.unwrap();
            }
        });

        let stats = engine.run(rx).await;
        producer.await.unwrap();

        assert_eq!(stats.events_received, 4);
        assert_eq!(stats.events_discarded, 1);
        assert_eq!(stats.scans, 3);
        assert_eq!(stats.opportunities, 3);

        let mut reported = Vec::new();
        while let Ok(opportunity) = report_rx.try_recv() {
            reported.push(opportunity);
        }
        assert_eq!(for_cycle(&reported, ["A", "B", "C"]).len(), 1);
        assert_eq!(reported.len(), 3);
    }
}
