//! Node collaborator and venue adapter errors.

use alloy::primitives::Address;

/// Errors that can occur while subscribing to and decoding venue swap events
#[derive(Debug, thiserror::Error)]
pub enum DexError {
    #[error("Failed to connect to node {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("Failed to subscribe to swap events of pool {pool}: {message}")]
    SubscriptionFailed { pool: Address, message: String },

    #[error("Subscription for pool {pool} lagged and skipped {skipped} notifications")]
    SubscriptionLagged { pool: Address, skipped: u64 },

    #[error("Failed to fetch block header {block_number}: {message}")]
    HeaderFetchFailed { block_number: u64, message: String },

    #[error("Block {block_number} not found")]
    BlockNotFound { block_number: u64 },

    #[error("Swap log from pool {pool} carries no block number")]
    MissingBlockNumber { pool: Address },

    #[error("Failed to decode {venue} swap log from pool {pool}: {message}")]
    DecodeFailed {
        venue: String,
        pool: Address,
        message: String,
    },

    #[error("No adapter registered for venue {venue}")]
    UnsupportedVenue { venue: String },

    #[error("Pricing failed for pool {pool}: {source}")]
    Pricing {
        pool: Address,
        #[source]
        source: super::PricingError,
    },
}
