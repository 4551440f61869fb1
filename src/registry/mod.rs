//! Token and pool registries shared between the adapters and the engine.
//!
//! Both registries are concurrent key-value stores behind a single
//! reader-writer lock each. The access pattern is many readers (the search
//! loop, adapters resolving decimals at startup) and one writer (the engine's
//! consumer task), so a coarse lock per registry is enough: every write
//! replaces whole fields atomically under that lock.
//!
//! The pool registry also owns the best-pool-per-directed-pair index used by
//! the triangular search.

pub mod pools;
pub mod tokens;
pub mod types;

// Re-export all public types for convenience
pub use pools::{PoolRegistry, QuoteBook};
pub use tokens::TokenRegistry;
pub use types::{BestQuote, DirectedPair, PairKey, Pool, Token, TokenKey, Venue};
