//! Triangular Arbitrage Watcher Library
//!
//! Watches swap events on concentrated-liquidity DEX pools, keeps a live view
//! of every pool's exchange rate in both directions, and scans all three-token
//! cycles after every update to report cycles whose compounded output beats a
//! threshold.
//!
//! # Architecture Overview
//!
//! - **`registry`**: Concurrent token and pool registries plus the best-pool index
//! - **`pricing`**: Square-root fixed-point price normalization
//! - **`dex`**: Node collaborator and per-venue swap adapters
//! - **`engine`**: The consumer task and the triangular cycle search
//! - **`pipeline`**: Supervised watcher set wired to the engine
//! - **`config`**: Environment and market-file configuration
//! - **`builders`**: Registry and engine construction
//! - **`errors`**: Domain error types
//! - **`utils`**: Type conversions between the node and pricing sides
//!
//! # Data Flow
//!
//! ```text
//! node ──logs──► adapter (one per pool) ──NormalizedEvent──► engine ──► opportunities
//!                     │                                        │
//!                     └── reads TokenRegistry at startup       └── writes PoolRegistry
//! ```
//!
//! Adapters and the engine only share the registries and one aggregation
//! channel. The engine is the only writer of pool amounts.
//!
//! # Core Concepts
//!
//! - **Unit-input output amount**: tokens received for exactly one unit of the
//!   source token, net of the venue fee
//! - **Best-pool index**: per directed token pair, the pool currently offering
//!   the highest unit-input output
//! - **Multiplier**: the product of the three legs' unit-input outputs; a cycle
//!   is profitable when it exceeds `1 + min_profit_bps / 10_000`

pub mod builders;
pub mod config;
pub mod dex;
pub mod engine;
pub mod errors;
pub mod pipeline;
pub mod pricing;
pub mod registry;
pub mod utils;

// Re-export the main Result type and error enum for convenience
pub use errors::{ArbitrageError, Result};

// Re-export builder patterns for convenience
pub use builders::{EngineBuilder, Registries, RegistryBuilder};

pub use engine::{ArbitrageEngine, ArbitrageOpportunity};
pub use pipeline::{Pipeline, PipelineReport, RunningPipeline};

// Module-specific result types for better ergonomics
pub type RegistryResult<T> = std::result::Result<T, errors::RegistryError>;
pub type PricingResult<T> = std::result::Result<T, errors::PricingError>;
pub type DexResult<T> = std::result::Result<T, errors::DexError>;
