//! Venue adapters: from raw swap logs to normalized events.
//!
//! One `DexAdapter` implementation exists per venue family. Each adapter task
//! watches exactly one pool:
//!
//! ```text
//! Subscribing ──► Watching ──► Watching   (per-event failures are logged)
//!                    │
//!                    └──────► Terminated  (shutdown, subscription end, channel closed)
//! ```
//!
//! Adapters never touch the registries. They resolve everything they need from
//! the `WatchedPool` handed to them at startup and publish `NormalizedEvent`s on
//! the aggregation channel.

pub mod algebra;
pub mod events;
pub mod node;
pub mod pancakeswap_v3;
pub mod uniswap_v3;

pub use algebra::AlgebraAdapter;
pub use node::{LogStream, NodeClient, WsNodeClient};
pub use pancakeswap_v3::PancakeswapV3Adapter;
pub use uniswap_v3::UniswapV3Adapter;

use crate::errors::DexError;
use crate::pricing::{normalize_price, FEE_UNITS_PER_WHOLE};
use crate::registry::{Pool, TokenKey, TokenRegistry, Venue};
use crate::utils::{block_latency, u256_to_biguint};
use crate::{DexResult, RegistryResult};
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::Log;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use futures::StreamExt;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Price-relevant content of one decoded swap log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSwap {
    pub block_number: u64,
    /// Pool price after the swap, `sqrt(token1/token0)` in Q64.96
    pub sqrt_price_x96: BigUint,
    pub transaction_hash: Option<B256>,
}

impl RawSwap {
    /// Build a `RawSwap` from a log and the sqrt price decoded from it.
    pub fn from_log(log: &Log, sqrt_price_x96: U256) -> DexResult<Self> {
        let block_number = log
            .block_number
            .ok_or(DexError::MissingBlockNumber { pool: log.address() })?;

        Ok(Self {
            block_number,
            sqrt_price_x96: u256_to_biguint(sqrt_price_x96),
            transaction_hash: log.transaction_hash,
        })
    }
}

/// Static description of the pool an adapter watches.
///
/// Token decimals are resolved once from the token registry when the watcher
/// starts; they never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedPool {
    pub address: Address,
    pub venue: Venue,
    pub fee: u32,
    pub token0: TokenKey,
    pub token1: TokenKey,
    pub decimals0: u8,
    pub decimals1: u8,
}

impl WatchedPool {
    /// Resolve a registry pool's token references into a watch description.
    pub fn resolve(pool: &Pool, tokens: &TokenRegistry) -> RegistryResult<Self> {
        let token0 = tokens.lookup_by_symbol(&pool.token0.symbol)?;
        let token1 = tokens.lookup_by_symbol(&pool.token1.symbol)?;

        Ok(Self {
            address: pool.address,
            venue: pool.venue,
            fee: pool.fee,
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            decimals0: token0.decimals,
            decimals1: token1.decimals,
        })
    }
}

/// A swap observation normalized into unit-input output amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub venue: Venue,
    pub pool_address: Address,
    pub block_number: u64,
    /// Receipt time minus block timestamp
    pub latency: chrono::Duration,
    pub fee: u32,
    pub token0_symbol: String,
    pub token1_symbol: String,
    /// token0 → token1 output for one unit of token0
    pub amount_out_forward: BigDecimal,
    /// token1 → token0 output for one unit of token1
    pub amount_out_backward: BigDecimal,
}

/// Why an adapter stopped watching its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// The shutdown signal fired (or its sender was dropped)
    Cancelled,
    /// The node closed the subscription
    SubscriptionEnded,
    /// The engine is gone; nobody is receiving events
    ChannelClosed,
}

/// Contract shared by every venue adapter.
///
/// Implementations only describe what differs between venues: which event to
/// subscribe to, how to pull the sqrt price out of it, and the fee unit
/// convention. The watch loop itself is shared.
#[async_trait]
pub trait DexAdapter: Send + Sync {
    /// Venue this adapter serves
    fn venue(&self) -> Venue;

    /// First topic of the venue's swap event
    fn swap_topic(&self) -> B256;

    /// Fee units per whole; passed to the normalizer explicitly
    fn fee_scale(&self) -> u32 {
        FEE_UNITS_PER_WHOLE
    }

    /// Decode a raw log into its price-relevant content.
    fn decode_swap(&self, log: &Log) -> DexResult<RawSwap>;

    /// Open the swap subscription for a pool.
    async fn subscribe(&self, client: &dyn NodeClient, pool: &WatchedPool) -> DexResult<LogStream> {
        client.subscribe_swaps(pool.address, self.swap_topic()).await
    }

    /// Turn one raw log into a normalized event.
    ///
    /// Fetches the block header for latency, decodes the venue payload, and
    /// runs the price normalizer.
    async fn normalize(&self, client: &dyn NodeClient, pool: &WatchedPool, log: &Log) -> DexResult<NormalizedEvent> {
        let block_number = log
            .block_number
            .ok_or(DexError::MissingBlockNumber { pool: pool.address })?;

        let timestamp = client.block_timestamp(block_number).await?;
        let latency = block_latency(Utc::now(), timestamp).map_err(|e| DexError::HeaderFetchFailed {
            block_number,
            message: e.to_string(),
        })?;

        let swap = self.decode_swap(log)?;
        let price = normalize_price(
            &swap.sqrt_price_x96,
            pool.fee,
            self.fee_scale(),
            pool.decimals0,
            pool.decimals1,
        )
        .map_err(|source| DexError::Pricing {
            pool: pool.address,
            source,
        })?;

        Ok(NormalizedEvent {
            venue: self.venue(),
            pool_address: pool.address,
            block_number: swap.block_number,
            latency,
            fee: pool.fee,
            token0_symbol: pool.token0.symbol.clone(),
            token1_symbol: pool.token1.symbol.clone(),
            amount_out_forward: price.forward,
            amount_out_backward: price.backward,
        })
    }

    /// Watch a pool until shutdown, publishing every normalized swap.
    ///
    /// Per-event failures and delivery errors are logged and skipped. Sending
    /// suspends while the engine is busy, which is how a slow scan throttles
    /// ingestion.
    async fn watch(
        &self,
        client: Arc<dyn NodeClient>,
        pool: WatchedPool,
        mut swaps: LogStream,
        events: mpsc::Sender<NormalizedEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> WatchExit {
        tracing::info!(
            venue = %pool.venue,
            pool = %pool.address,
            pair = %format!("{}/{}", pool.token0, pool.token1),
            fee = pool.fee,
            "Watching swap events"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!(venue = %pool.venue, pool = %pool.address, "Watcher cancelled");
                    return WatchExit::Cancelled;
                }

                next = swaps.next() => match next {
                    Some(Ok(log)) => {
                        let event = match self.normalize(client.as_ref(), &pool, &log).await {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::warn!(
                                    venue = %pool.venue,
                                    pool = %pool.address,
                                    error = %e,
                                    "Dropping swap event"
                                );
                                continue;
                            }
                        };

                        if events.send(event).await.is_err() {
                            tracing::warn!(pool = %pool.address, "Aggregation channel closed, stopping watcher");
                            return WatchExit::ChannelClosed;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!(venue = %pool.venue, pool = %pool.address, error = %e, "Subscription error");
                    }
                    None => {
                        tracing::error!(venue = %pool.venue, pool = %pool.address, "Subscription ended");
                        return WatchExit::SubscriptionEnded;
                    }
                }
            }
        }
    }
}

/// Adapters keyed by venue, constructed explicitly and shared by the pipeline.
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: HashMap<Venue, Arc<dyn DexAdapter>>,
}

impl AdapterSet {
    /// Create an empty adapter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter set covering every supported venue
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(Arc::new(UniswapV3Adapter::new(Venue::UniswapV3)));
        set.register(Arc::new(UniswapV3Adapter::new(Venue::SushiswapV3)));
        set.register(Arc::new(AlgebraAdapter::new(Venue::QuickswapV3)));
        set.register(Arc::new(PancakeswapV3Adapter::new()));
        set
    }

    /// Register an adapter, replacing any previous one for the same venue
    pub fn register(&mut self, adapter: Arc<dyn DexAdapter>) {
        self.adapters.insert(adapter.venue(), adapter);
    }

    /// Adapter for a venue.
    pub fn get(&self, venue: Venue) -> DexResult<Arc<dyn DexAdapter>> {
        self.adapters
            .get(&venue)
            .cloned()
            .ok_or_else(|| DexError::UnsupportedVenue { venue: venue.to_string() })
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::str::FromStr;

    fn watched(venue: Venue, decimals0: u8, decimals1: u8) -> WatchedPool {
        WatchedPool {
            address: Address::repeat_byte(0x50),
            venue,
            fee: 500,
            token0: TokenKey { symbol: "USDC".into(), address: Address::repeat_byte(0x01) },
            token1: TokenKey { symbol: "WETH".into(), address: Address::repeat_byte(0x02) },
            decimals0,
            decimals1,
        }
    }

    #[test]
    fn test_watched_pool_resolves_decimals() {
        let tokens = TokenRegistry::new();
        let usdc = crate::registry::Token::new("USDC", Address::repeat_byte(0x01), 6, true);
        let weth = crate::registry::Token::new("WETH", Address::repeat_byte(0x02), 18, false);
        tokens.insert(usdc.clone()).unwrap();
        tokens.insert(weth.clone()).unwrap();

        let pool = Pool::new(Address::repeat_byte(0x50), Venue::UniswapV3, 500, usdc.key(), weth.key());
        let resolved = WatchedPool::resolve(&pool, &tokens).unwrap();
        assert_eq!(resolved, watched(Venue::UniswapV3, 6, 18));

        let dangling = Pool::new(
            Address::repeat_byte(0x51),
            Venue::UniswapV3,
            500,
            usdc.key(),
            TokenKey { symbol: "LINK".into(), address: Address::repeat_byte(0x06) },
        );
        assert!(WatchedPool::resolve(&dangling, &tokens).is_err());
    }

    #[test]
    fn test_decode_each_venue() {
        let pool = Address::repeat_byte(0x50);
        let sqrt = q96() * U256::from(3u8);
        let expected = u256_to_biguint(sqrt);

        let uni = UniswapV3Adapter::new(Venue::UniswapV3).decode_swap(&uniswap_v3_log(pool, 9, sqrt)).unwrap();
        assert_eq!(uni.block_number, 9);
        assert_eq!(uni.sqrt_price_x96, expected);

        let quick = AlgebraAdapter::new(Venue::QuickswapV3).decode_swap(&algebra_log(pool, 10, sqrt)).unwrap();
        assert_eq!(quick.sqrt_price_x96, expected);

        let cake = PancakeswapV3Adapter::new().decode_swap(&pancake_v3_log(pool, 11, sqrt)).unwrap();
        assert_eq!(cake.block_number, 11);
        assert_eq!(cake.sqrt_price_x96, expected);
    }

    #[test]
    fn test_decode_rejects_foreign_event() {
        let pool = Address::repeat_byte(0x50);
        let err = PancakeswapV3Adapter::new()
            .decode_swap(&uniswap_v3_log(pool, 9, q96()))
            .unwrap_err();
        assert!(matches!(err, DexError::DecodeFailed { .. }));
    }

    #[test]
    fn test_decode_requires_block_number() {
        let mut log = uniswap_v3_log(Address::repeat_byte(0x50), 9, q96());
        log.block_number = None;
        let err = UniswapV3Adapter::new(Venue::UniswapV3).decode_swap(&log).unwrap_err();
        assert!(matches!(err, DexError::MissingBlockNumber { .. }));
    }

    #[tokio::test]
    async fn test_normalize_event() {
        let node = ScriptedNode::new();
        let pool = watched(Venue::SushiswapV3, 6, 18);
        let adapter = UniswapV3Adapter::new(Venue::SushiswapV3);

        let event = adapter
            .normalize(&node, &pool, &uniswap_v3_log(pool.address, 42, q96()))
            .await
            .unwrap();

        assert_eq!(event.venue, Venue::SushiswapV3);
        assert_eq!(event.pool_address, pool.address);
        assert_eq!(event.block_number, 42);
        assert_eq!(event.fee, 500);
        assert_eq!(event.token0_symbol, "USDC");
        assert_eq!(event.token1_symbol, "WETH");
        assert_eq!(event.amount_out_forward, BigDecimal::from_str("0.0000000000009995").unwrap());
        assert_eq!(event.amount_out_backward, BigDecimal::from_str("999500000000").unwrap());
        // Scripted blocks are far in the past
        assert!(event.latency > chrono::Duration::zero());
    }

    #[tokio::test]
    async fn test_normalize_header_failure() {
        let node = ScriptedNode::new();
        node.fail_block(42);
        let pool = watched(Venue::UniswapV3, 6, 18);

        let err = UniswapV3Adapter::new(Venue::UniswapV3)
            .normalize(&node, &pool, &uniswap_v3_log(pool.address, 42, q96()))
            .await
            .unwrap_err();
        assert!(matches!(err, DexError::HeaderFetchFailed { block_number: 42, .. }));
    }

    #[tokio::test]
    async fn test_normalize_invalid_price() {
        let node = ScriptedNode::new();
        let pool = watched(Venue::UniswapV3, 6, 18);

        let err = UniswapV3Adapter::new(Venue::UniswapV3)
            .normalize(&node, &pool, &uniswap_v3_log(pool.address, 42, U256::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, DexError::Pricing { .. }));
    }

    #[tokio::test]
    async fn test_watch_skips_bad_events_and_ends_with_subscription() {
        let node = Arc::new(ScriptedNode::new());
        let pool = watched(Venue::UniswapV3, 18, 18);
        let feed = node.feed(pool.address);
        let adapter = UniswapV3Adapter::new(Venue::UniswapV3);

        let swaps = adapter.subscribe(node.as_ref(), &pool).await.unwrap();
        assert_eq!(node.subscribed_topics(), vec![(pool.address, adapter.swap_topic())]);

        node.fail_block(2);
        feed.send(Ok(uniswap_v3_log(pool.address, 1, q96()))).unwrap();
        feed.send(Ok(uniswap_v3_log(pool.address, 2, q96()))).unwrap();
        feed.send(Err(DexError::SubscriptionLagged { pool: pool.address, skipped: 3 })).unwrap();
        feed.send(Ok(uniswap_v3_log(pool.address, 3, U256::ZERO))).unwrap();
        feed.send(Ok(uniswap_v3_log(pool.address, 4, q96() * U256::from(2u8)))).unwrap();
        drop(feed);

        let (tx, mut rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let client: Arc<dyn NodeClient> = node.clone();

        let handle = tokio::spawn(async move { adapter.watch(client, pool, swaps, tx, shutdown_rx).await });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.block_number, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.block_number, 4);
        assert_eq!(second.amount_out_forward, BigDecimal::from_str("3.998").unwrap());
        assert!(rx.recv().await.is_none());

        assert_eq!(handle.await.unwrap(), WatchExit::SubscriptionEnded);
    }

    #[tokio::test]
    async fn test_watch_stops_on_shutdown() {
        let node = Arc::new(ScriptedNode::new());
        let pool = watched(Venue::QuickswapV3, 18, 18);
        let _feed = node.feed(pool.address);
        let adapter = AlgebraAdapter::new(Venue::QuickswapV3);
        let swaps = adapter.subscribe(node.as_ref(), &pool).await.unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let client: Arc<dyn NodeClient> = node.clone();
        let handle = tokio::spawn(async move { adapter.watch(client, pool, swaps, tx, shutdown_rx).await });

        shutdown_tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), WatchExit::Cancelled);
        // The sender was dropped with the watcher
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_watch_stops_when_channel_closes() {
        let node = Arc::new(ScriptedNode::new());
        let pool = watched(Venue::UniswapV3, 18, 18);
        let feed = node.feed(pool.address);
        let adapter = UniswapV3Adapter::new(Venue::UniswapV3);
        let swaps = adapter.subscribe(node.as_ref(), &pool).await.unwrap();

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        feed.send(Ok(uniswap_v3_log(pool.address, 1, q96()))).unwrap();

        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let exit = adapter.watch(node.clone(), pool, swaps, tx, shutdown_rx).await;
        assert_eq!(exit, WatchExit::ChannelClosed);
    }

    #[tokio::test]
    async fn test_subscribe_failure() {
        let node = ScriptedNode::new();
        let pool = watched(Venue::UniswapV3, 18, 18);
        let result = UniswapV3Adapter::new(Venue::UniswapV3).subscribe(&node, &pool).await;
        assert!(matches!(result, Err(DexError::SubscriptionFailed { .. })));
    }

    #[test]
    fn test_adapter_set_defaults() {
        let set = AdapterSet::with_defaults();
        assert_eq!(set.len(), Venue::ALL.len());
        for venue in Venue::ALL {
            assert_eq!(set.get(venue).unwrap().venue(), venue);
            assert_eq!(set.get(venue).unwrap().fee_scale(), FEE_UNITS_PER_WHOLE);
        }
        assert!(AdapterSet::new().get(Venue::UniswapV3).is_err());
    }
}
