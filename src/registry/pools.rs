//! Concurrent pool registry with an incrementally maintained best-pool index.

use super::types::{BestQuote, DirectedPair, PairKey, Pool, Venue};
use crate::errors::RegistryError;
use crate::RegistryResult;
use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Snapshot of the best quote for every directed pair that currently has one.
pub type QuoteBook = HashMap<DirectedPair, BestQuote>;

/// Thread-safe store of pools and their latest exchange rates.
///
/// Besides the pools themselves the registry keeps, under the same lock:
/// - the pools trading each unordered token pair, in insertion order
/// - the best quote for each directed pair
///
/// The best-quote index is recomputed for a pool's pair whenever that pool's
/// amounts change, so the arbitrage scan reads each leg in O(1) instead of
/// walking every pool.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    inner: RwLock<PoolTables>,
}

#[derive(Debug, Default)]
struct PoolTables {
    pools: HashMap<Address, Pool>,
    pools_by_pair: HashMap<PairKey, Vec<Address>>,
    best: QuoteBook,
}

impl PoolTables {
    /// Recompute both directions of the pair traded by `token_a`/`token_b`.
    fn reindex_pair(&mut self, token_a: &str, token_b: &str) {
        let members = self
            .pools_by_pair
            .get(&PairKey::new(token_a, token_b))
            .cloned()
            .unwrap_or_default();

        for (from, to) in [(token_a, token_b), (token_b, token_a)] {
            let mut best: Option<BestQuote> = None;

            for address in &members {
                let Some(pool) = self.pools.get(address) else {
                    continue;
                };
                let Some(amount) = pool.amount_out_from(from) else {
                    continue;
                };
                // Strictly greater wins; ties keep the earlier-registered pool.
                if best.as_ref().map_or(true, |current| *amount > current.amount_out) {
                    best = Some(BestQuote {
                        pool: pool.address,
                        venue: pool.venue,
                        amount_out: amount.clone(),
                    });
                }
            }

            let key = (from.to_string(), to.to_string());
            match best {
                Some(quote) => {
                    self.best.insert(key, quote);
                }
                None => {
                    self.best.remove(&key);
                }
            }
        }
    }
}

impl PoolRegistry {
    /// Create a new empty pool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pool.
    ///
    /// Token references are validated against the token registry by
    /// `RegistryBuilder`; here only the pool's own invariants are checked.
    ///
    /// # Errors
    ///
    /// - `DuplicatePool` if a pool with the same address exists
    /// - `InvalidPool` if both sides of the pool are the same token
    pub fn insert(&self, pool: Pool) -> RegistryResult<()> {
        if pool.token0.symbol == pool.token1.symbol || pool.token0.address == pool.token1.address {
            return Err(RegistryError::InvalidPool {
                address: pool.address,
                reason: format!("token0 and token1 are both {}", pool.token0.symbol),
            });
        }

        let mut tables = self.inner.write();
        if tables.pools.contains_key(&pool.address) {
            return Err(RegistryError::DuplicatePool { address: pool.address });
        }

        tracing::debug!(
            pool = %pool.address,
            venue = %pool.venue,
            fee = pool.fee,
            token0 = %pool.token0,
            token1 = %pool.token1,
            "Pool registered"
        );

        let (symbol0, symbol1) = (pool.token0.symbol.clone(), pool.token1.symbol.clone());
        let has_quotes = pool.quotes().is_some();

        tables.pools_by_pair.entry(pool.pair()).or_default().push(pool.address);
        tables.pools.insert(pool.address, pool);

        if has_quotes {
            tables.reindex_pair(&symbol0, &symbol1);
        }
        Ok(())
    }

    /// Look up a pool by its address.
    pub fn lookup_by_address(&self, address: &Address) -> RegistryResult<Pool> {
        self.inner
            .read()
            .pools
            .get(address)
            .cloned()
            .ok_or(RegistryError::PoolNotFound { address: *address })
    }

    /// Find the pool of a venue trading the given pair, in either token order.
    pub fn find_by_pair_and_venue(&self, symbol0: &str, symbol1: &str, venue: Venue) -> RegistryResult<Pool> {
        let tables = self.inner.read();
        tables
            .pools_by_pair
            .get(&PairKey::new(symbol0, symbol1))
            .into_iter()
            .flatten()
            .filter_map(|address| tables.pools.get(address))
            .find(|pool| pool.venue == venue)
            .cloned()
            .ok_or_else(|| RegistryError::PairNotFound {
                symbol0: symbol0.to_string(),
                symbol1: symbol1.to_string(),
                venue: venue.to_string(),
            })
    }

    /// Point-in-time snapshot of all pools, sorted by address.
    pub fn list_all(&self) -> Vec<Pool> {
        let mut pools: Vec<Pool> = self.inner.read().pools.values().cloned().collect();
        pools.sort_by_key(|pool| pool.address);
        pools
    }

    /// Overwrite both directional amounts of a pool and refresh the best-pool index.
    ///
    /// Writing the same values twice leaves the registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound` if no pool has the given address.
    pub fn update_amounts(
        &self,
        address: &Address,
        forward: BigDecimal,
        backward: BigDecimal,
        block_number: u64,
    ) -> RegistryResult<()> {
        let mut tables = self.inner.write();
        let pool = tables
            .pools
            .get_mut(address)
            .ok_or(RegistryError::PoolNotFound { address: *address })?;

        pool.amount_out_forward = Some(forward);
        pool.amount_out_backward = Some(backward);
        pool.last_block = Some(block_number);

        let (symbol0, symbol1) = (pool.token0.symbol.clone(), pool.token1.symbol.clone());
        tables.reindex_pair(&symbol0, &symbol1);
        Ok(())
    }

    /// Remove a pool by address, returning it.
    pub fn remove(&self, address: &Address) -> RegistryResult<Pool> {
        let mut tables = self.inner.write();
        let pool = tables
            .pools
            .remove(address)
            .ok_or(RegistryError::PoolNotFound { address: *address })?;

        let pair = pool.pair();
        if let Some(members) = tables.pools_by_pair.get_mut(&pair) {
            members.retain(|member| member != address);
            if members.is_empty() {
                tables.pools_by_pair.remove(&pair);
            }
        }
        tables.reindex_pair(&pool.token0.symbol, &pool.token1.symbol);
        Ok(pool)
    }

    /// Best quote for swapping `from` into `to`, if any pool has one.
    pub fn best_quote(&self, from: &str, to: &str) -> Option<BestQuote> {
        self.inner
            .read()
            .best
            .get(&(from.to_string(), to.to_string()))
            .cloned()
    }

    /// Snapshot of the whole best-pool index.
    pub fn quote_book(&self) -> QuoteBook {
        self.inner.read().best.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
