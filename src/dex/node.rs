//! Node collaborator: swap-log subscriptions and block header lookups.
//!
//! Adapters only talk to the chain through the `NodeClient` trait, which keeps
//! them independent of the transport. `WsNodeClient` is the production
//! implementation over an Alloy WebSocket provider.

use crate::errors::DexError;
use crate::DexResult;
use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::error::RecvError;

/// Stream of raw swap logs for one pool.
///
/// `Err` items are delivery problems (e.g. lagged notifications) after which
/// the stream keeps going; the stream ends when the subscription is closed.
pub type LogStream = BoxStream<'static, DexResult<Log>>;

/// Everything the adapters need from a blockchain node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Subscribe to logs emitted by `pool` whose first topic is `topic`.
    async fn subscribe_swaps(&self, pool: Address, topic: B256) -> DexResult<LogStream>;

    /// Timestamp (seconds since the epoch) of the block with the given number.
    async fn block_timestamp(&self, block_number: u64) -> DexResult<u64>;
}

/// `NodeClient` backed by an Alloy WebSocket provider.
#[derive(Clone)]
pub struct WsNodeClient {
    provider: DynProvider,
    url: String,
}

impl WsNodeClient {
    /// Connect to a node over WebSocket.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailed` if the WebSocket handshake fails.
    pub async fn connect(url: &str) -> DexResult<Self> {
        tracing::info!(url = %url, "Connecting to node");

        let provider = ProviderBuilder::new()
            .connect_ws(WsConnect::new(url))
            .await
            .map_err(|e| DexError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .erased();

        Ok(Self {
            provider,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NodeClient for WsNodeClient {
    async fn subscribe_swaps(&self, pool: Address, topic: B256) -> DexResult<LogStream> {
        let filter = Filter::new().address(pool).event_signature(topic);

        let subscription = self
            .provider
            .subscribe_logs(&filter)
            .await
            .map_err(|e| DexError::SubscriptionFailed {
                pool,
                message: e.to_string(),
            })?;

        let logs = stream::unfold(subscription, move |mut subscription| async move {
            match subscription.recv().await {
                Ok(log) => Some((Ok(log), subscription)),
                Err(RecvError::Lagged(skipped)) => {
                    Some((Err(DexError::SubscriptionLagged { pool, skipped }), subscription))
                }
                Err(RecvError::Closed) => None,
            }
        });

        Ok(logs.boxed())
    }

    async fn block_timestamp(&self, block_number: u64) -> DexResult<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .map_err(|e| DexError::HeaderFetchFailed {
                block_number,
                message: e.to_string(),
            })?
            .ok_or(DexError::BlockNotFound { block_number })?;

        Ok(block.header.timestamp)
    }
}
