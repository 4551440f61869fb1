//! Error handling and reporting for the arbitrage watcher.
//!
//! This module provides a hierarchical error system with one error type per
//! major component of the library. Each domain error is small and typed so that
//! callers can decide between the three failure classes the watcher knows about:
//!
//! - **Fatal**: startup failures (node connection, subscriptions, duplicate or
//!   dangling registry keys, invalid configuration). These surface through
//!   `ArbitrageError` and abort the process.
//! - **Transient**: per-event failures inside an adapter (header fetch, decode,
//!   invalid price). These are logged and the event is dropped.
//! - **Logic**: registry lookup misses. These are returned to the caller as typed
//!   `RegistryError`s, logged, and the operation is skipped.
//!
//! # Error Hierarchy
//!
//! - **`RegistryError`**: token and pool registry operations
//! - **`PricingError`**: price normalization failures
//! - **`DexError`**: node collaborator and venue adapter failures
//! - **`ConfigError`**: configuration loading and validation
//! - **`UtilityError`**: type conversions and address parsing

pub mod config;
pub mod dex;
pub mod pricing;
pub mod registry;
pub mod utility;

// Re-export all error types for convenience
pub use config::ConfigError;
pub use dex::DexError;
pub use pricing::PricingError;
pub use registry::RegistryError;
pub use utility::UtilityError;

/// Main result type for the library
pub type Result<T> = std::result::Result<T, ArbitrageError>;

/// Top-level error enum that encompasses all possible errors in the watcher.
///
/// Provides automatic conversion from all domain-specific errors and the
/// external dependencies whose errors can reach the process boundary.
#[derive(Debug, thiserror::Error)]
pub enum ArbitrageError {
    /// Error in token or pool registry operations.
    #[error("Registry operation failed: {0}")]
    Registry(#[from] RegistryError),

    /// Error while normalizing a venue price.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Error from the node collaborator or a venue adapter.
    ///
    /// This includes connection and subscription failures, which are fatal
    /// when they happen at startup.
    #[error("DEX adapter error: {0}")]
    Dex(#[from] DexError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error in utility functions or type conversions.
    #[error("Utility error: {0}")]
    Utility(#[from] UtilityError),

    /// JSON serialization or deserialization error.
    ///
    /// Raised while reading the market file.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error, e.g. while reading the market file or opening the log file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RPC communication error with the blockchain node.
    #[error("RPC error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),

    /// Generic error for cases not covered by specific error types.
    #[error("Generic error: {0}")]
    Other(#[from] anyhow::Error),
}
