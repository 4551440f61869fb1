//! Builder pattern for the token and pool registries

use crate::config::MarketConfig;
use crate::errors::Result;
use crate::registry::{Pool, PoolRegistry, Token, TokenRegistry, Venue};
use crate::utils::string_to_address;
use alloy::primitives::Address;
use std::sync::Arc;

/// Shared handles to a populated pair of registries.
#[derive(Debug, Clone)]
pub struct Registries {
    pub tokens: Arc<TokenRegistry>,
    pub pools: Arc<PoolRegistry>,
}

struct PendingPool {
    address: Address,
    venue: Venue,
    fee: u32,
    token0: String,
    token1: String,
}

/// Builder for populating both registries with a fluent API.
///
/// Pools reference their tokens by symbol; the references are resolved against
/// the builder's tokens in `build`.
pub struct RegistryBuilder {
    tokens: Vec<Token>,
    pools: Vec<PendingPool>,
}

impl RegistryBuilder {
    /// Create a new empty RegistryBuilder
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            pools: Vec::new(),
        }
    }

    /// Create a builder holding every token and pool of a market file.
    ///
    /// # Errors
    ///
    /// Returns an error if any address in the market file cannot be parsed.
    pub fn from_markets(markets: &MarketConfig) -> Result<Self> {
        let mut builder = Self::new();

        for token in &markets.tokens {
            let address = string_to_address(&token.address)?;
            builder = builder.add_token(Token::new(token.symbol.clone(), address, token.decimals, token.holdable));
        }
        for pool in &markets.pools {
            let address = string_to_address(&pool.address)?;
            builder = builder.add_pool(address, pool.venue, pool.fee, &pool.token0, &pool.token1);
        }

        Ok(builder)
    }

    /// Add a token
    pub fn add_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Add multiple tokens
    pub fn add_tokens<I>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = Token>,
    {
        self.tokens.extend(tokens);
        self
    }

    /// Add a pool between two token symbols
    ///
    /// # Arguments
    ///
    /// * `address` - The address of the pool contract
    /// * `venue` - The venue the pool belongs to
    /// * `fee` - Fee in venue-native units
    /// * `token0`, `token1` - Symbols of the pool's tokens, in pool order
    pub fn add_pool(mut self, address: Address, venue: Venue, fee: u32, token0: &str, token1: &str) -> Self {
        self.pools.push(PendingPool {
            address,
            venue,
            fee,
            token0: token0.to_string(),
            token1: token1.to_string(),
        });
        self
    }

    /// Build the registries
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate token symbol, token address or pool
    /// address, or on a pool that references an unknown token.
    pub fn build(self) -> Result<Registries> {
        let tokens = TokenRegistry::from_tokens(self.tokens)?;
        let pools = PoolRegistry::new();

        for pending in self.pools {
            let token0 = tokens.lookup_by_symbol(&pending.token0)?;
            let token1 = tokens.lookup_by_symbol(&pending.token1)?;
            pools.insert(Pool::new(
                pending.address,
                pending.venue,
                pending.fee,
                token0.key(),
                token1.key(),
            ))?;
        }

        tracing::info!(tokens = tokens.len(), pools = pools.len(), "Registries populated");

        Ok(Registries {
            tokens: Arc::new(tokens),
            pools: Arc::new(pools),
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, TokenConfig};
    use crate::errors::{ArbitrageError, RegistryError};

    fn token(symbol: &str, byte: u8) -> Token {
        Token::new(symbol, Address::repeat_byte(byte), 18, false)
    }

    fn registry_error(result: Result<Registries>) -> RegistryError {
        match result {
            Err(ArbitrageError::Registry(e)) => e,
            other => panic!("expected a registry error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_resolves_symbols() {
        let registries = RegistryBuilder::new()
            .add_tokens([token("A", 1), token("B", 2)])
            .add_pool(Address::repeat_byte(0x10), Venue::UniswapV3, 500, "B", "A")
            .build()
            .unwrap();

        let pool = registries.pools.lookup_by_address(&Address::repeat_byte(0x10)).unwrap();
        assert_eq!(pool.token0, token("B", 2).key());
        assert_eq!(pool.token1, token("A", 1).key());
        assert_eq!(registries.tokens.len(), 2);
    }

    #[test]
    fn test_dangling_symbol_is_fatal() {
        let result = RegistryBuilder::new()
            .add_token(token("A", 1))
            .add_pool(Address::repeat_byte(0x10), Venue::UniswapV3, 500, "A", "Z")
            .build();
        assert_eq!(registry_error(result), RegistryError::TokenNotFound { symbol: "Z".to_string() });
    }

    #[test]
    fn test_duplicates_are_fatal() {
        let result = RegistryBuilder::new().add_tokens([token("A", 1), token("A", 2)]).build();
        assert!(registry_error(result).is_duplicate());

        let result = RegistryBuilder::new()
            .add_tokens([token("A", 1), token("B", 2)])
            .add_pool(Address::repeat_byte(0x10), Venue::UniswapV3, 500, "A", "B")
            .add_pool(Address::repeat_byte(0x10), Venue::QuickswapV3, 900, "A", "B")
            .build();
        assert_eq!(
            registry_error(result),
            RegistryError::DuplicatePool { address: Address::repeat_byte(0x10) }
        );
    }

    #[test]
    fn test_from_markets() {
        let markets = MarketConfig {
            tokens: vec![
                TokenConfig {
                    symbol: "USDC".into(),
                    address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".into(),
                    decimals: 6,
                    holdable: true,
                },
                TokenConfig {
                    symbol: "WETH".into(),
                    address: "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619".into(),
                    decimals: 18,
                    holdable: false,
                },
            ],
            pools: vec![PoolConfig {
                address: "0xA4D8c89f0c20efbe54cBa9e7e7a7E509056228D9".into(),
                venue: Venue::UniswapV3,
                fee: 500,
                token0: "USDC".into(),
                token1: "WETH".into(),
            }],
        };

        let registries = RegistryBuilder::from_markets(&markets).unwrap().build().unwrap();
        let usdc = registries.tokens.lookup_by_symbol("USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(usdc.holdable);
        assert!(registries.pools.find_by_pair_and_venue("WETH", "USDC", Venue::UniswapV3).is_ok());

        let mut broken = markets.clone();
        broken.pools[0].address = "0x1234".into();
        assert!(matches!(
            RegistryBuilder::from_markets(&broken),
            Err(ArbitrageError::Utility(_))
        ));
    }
}
