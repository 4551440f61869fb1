//! Token and pool registry errors.

use alloy::primitives::Address;

/// Errors that can occur during registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Token with symbol {symbol} already exists")]
    DuplicateSymbol { symbol: String },

    #[error("Token with address {address} already exists")]
    DuplicateTokenAddress { address: Address },

    #[error("Pool with address {address} already exists")]
    DuplicatePool { address: Address },

    #[error("No token found with symbol {symbol}")]
    TokenNotFound { symbol: String },

    #[error("No token found with address {address}")]
    TokenAddressNotFound { address: Address },

    #[error("No pool found with address {address}")]
    PoolNotFound { address: Address },

    #[error("No {venue} pool found for pair {symbol0}/{symbol1}")]
    PairNotFound {
        symbol0: String,
        symbol1: String,
        venue: String,
    },

    #[error("Invalid pool {address}: {reason}")]
    InvalidPool { address: Address, reason: String },
}

impl RegistryError {
    /// Whether this error reports a key collision on insert.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSymbol { .. } | Self::DuplicateTokenAddress { .. } | Self::DuplicatePool { .. }
        )
    }

    /// Whether this error reports a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TokenNotFound { .. }
                | Self::TokenAddressNotFound { .. }
                | Self::PoolNotFound { .. }
                | Self::PairNotFound { .. }
        )
    }
}
