//! Supervised set of pool watchers feeding one arbitrage engine.
//!
//! `Pipeline::start` subscribes every registered pool (one adapter task per
//! pool), spawns the engine as the single consumer of the aggregation channel,
//! and hands back a `RunningPipeline`. Shutdown goes through a broadcast
//! signal: watchers stop and drop their senders, the engine drains whatever
//! is still queued and returns once the last sender is gone.

use crate::builders::Registries;
use crate::dex::{AdapterSet, DexAdapter, NodeClient, NormalizedEvent, WatchExit, WatchedPool};
use crate::engine::{ArbitrageEngine, EngineStats};
use crate::errors::Result;
use alloy::primitives::Address;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// Slots in the aggregation channel. A single slot makes every sender wait
/// until the engine has taken the previous event.
pub const AGGREGATION_CAPACITY: usize = 1;

/// Outcome of a finished pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// How each watcher ended, in completion order
    pub exits: Vec<(Address, WatchExit)>,
    pub engine: EngineStats,
}

/// Everything needed to start watching.
pub struct Pipeline {
    client: Arc<dyn NodeClient>,
    adapters: AdapterSet,
    registries: Registries,
    engine: ArbitrageEngine,
    subscribe_delay: Duration,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn NodeClient>,
        adapters: AdapterSet,
        registries: Registries,
        engine: ArbitrageEngine,
    ) -> Self {
        Self {
            client,
            adapters,
            registries,
            engine,
            subscribe_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive pool subscriptions.
    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = delay;
        self
    }

    /// Subscribe every pool and start the engine.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal: an unresolvable pool, a venue without an
    /// adapter, or a failed subscription. Watchers already started are shut
    /// down before the error is returned.
    pub async fn start(self) -> Result<RunningPipeline> {
        let mut plan: Vec<(WatchedPool, Arc<dyn DexAdapter>)> = Vec::new();
        for pool in self.registries.pools.list_all() {
            let watched = WatchedPool::resolve(&pool, &self.registries.tokens)?;
            let adapter = self.adapters.get(pool.venue)?;
            plan.push((watched, adapter));
        }

        let (events_tx, events_rx) = mpsc::channel::<NormalizedEvent>(AGGREGATION_CAPACITY);
        let (shutdown_tx, _) = broadcast::channel(1);
        let engine = tokio::spawn(self.engine.run(events_rx));

        let mut running = RunningPipeline {
            shutdown: shutdown_tx,
            watchers: JoinSet::new(),
            engine,
        };

        tracing::info!(pools = plan.len(), "Subscribing to pools");

        for (index, (pool, adapter)) in plan.into_iter().enumerate() {
            if index > 0 && !self.subscribe_delay.is_zero() {
                tokio::time::sleep(self.subscribe_delay).await;
            }

            let swaps = match adapter.subscribe(self.client.as_ref(), &pool).await {
                Ok(swaps) => swaps,
                Err(e) => {
                    tracing::error!(venue = %pool.venue, pool = %pool.address, error = %e, "Subscription failed");
                    drop(events_tx);
                    if let Err(join_error) = running.shutdown().await {
                        tracing::error!(error = %join_error, "Failed to stop pipeline after subscription failure");
                    }
                    return Err(e.into());
                }
            };

            tracing::debug!(venue = %pool.venue, pool = %pool.address, "Subscribed");

            let client = self.client.clone();
            let events = events_tx.clone();
            let shutdown = running.shutdown.subscribe();
            running.watchers.spawn(async move {
                let address = pool.address;
                let exit = adapter.watch(client, pool, swaps, events, shutdown).await;
                (address, exit)
            });
        }

        tracing::info!(watchers = running.watchers.len(), "Pipeline running");
        Ok(running)
    }
}

/// Handle to a started pipeline.
pub struct RunningPipeline {
    shutdown: broadcast::Sender<()>,
    watchers: JoinSet<(Address, WatchExit)>,
    engine: JoinHandle<EngineStats>,
}

impl RunningPipeline {
    /// Number of watcher tasks not yet joined.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Run until `signal` completes or every watcher has ended on its own,
    /// then shut down.
    pub async fn run_until<F>(mut self, signal: F) -> Result<PipelineReport>
    where
        F: Future<Output = ()>,
    {
        let finished = tokio::select! {
            _ = signal => None,
            joined = &mut self.engine => Some(joined),
        };

        match finished {
            None => {
                tracing::info!("Shutdown requested");
                self.shutdown().await
            }
            Some(joined) => {
                tracing::warn!("All watchers ended");
                let exits = join_watchers(&mut self.watchers).await;
                Ok(PipelineReport {
                    exits,
                    engine: joined.map_err(engine_failed)?,
                })
            }
        }
    }

    /// Signal every watcher to stop and wait for the engine to drain.
    pub async fn shutdown(mut self) -> Result<PipelineReport> {
        // No receivers left means every watcher already stopped.
        let _ = self.shutdown.send(());

        let exits = join_watchers(&mut self.watchers).await;
        let engine = self.engine.await.map_err(engine_failed)?;

        tracing::info!(
            watchers = exits.len(),
            events = engine.events_received,
            opportunities = engine.opportunities,
            "Pipeline stopped"
        );
        Ok(PipelineReport { exits, engine })
    }
}

async fn join_watchers(watchers: &mut JoinSet<(Address, WatchExit)>) -> Vec<(Address, WatchExit)> {
    let mut exits = Vec::with_capacity(watchers.len());
    while let Some(joined) = watchers.join_next().await {
        match joined {
            Ok(exit) => exits.push(exit),
            Err(e) => tracing::error!(error = %e, "Watcher task failed"),
        }
    }
    exits
}

fn engine_failed(e: JoinError) -> crate::errors::ArbitrageError {
    anyhow::anyhow!("Engine task failed: {}", e).into()
}
