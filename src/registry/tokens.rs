//! Concurrent token registry.

use super::types::Token;
use crate::errors::RegistryError;
use crate::RegistryResult;
use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe store of the tokens the watcher trades.
///
/// Tokens are indexed by symbol and by address; both keys are unique. All
/// operations take the single registry lock, so readers always observe a
/// token either before or after a complete update.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    inner: RwLock<TokenTables>,
}

#[derive(Debug, Default)]
struct TokenTables {
    by_symbol: HashMap<String, Token>,
    symbol_by_address: HashMap<Address, String>,
}

impl TokenRegistry {
    /// Create a new empty token registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry populated from a list of tokens.
    ///
    /// # Errors
    ///
    /// Fails on the first token whose symbol or address is already present.
    pub fn from_tokens<I>(tokens: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = Token>,
    {
        let registry = Self::new();
        for token in tokens {
            registry.insert(token)?;
        }
        Ok(registry)
    }

    /// Add a token.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSymbol` or `DuplicateTokenAddress` if either key is taken.
    pub fn insert(&self, token: Token) -> RegistryResult<()> {
        let mut tables = self.inner.write();

        if tables.by_symbol.contains_key(&token.symbol) {
            return Err(RegistryError::DuplicateSymbol { symbol: token.symbol });
        }
        if tables.symbol_by_address.contains_key(&token.address) {
            return Err(RegistryError::DuplicateTokenAddress { address: token.address });
        }

        tracing::debug!(
            symbol = %token.symbol,
            address = %token.address,
            decimals = token.decimals,
            "Token registered"
        );

        tables.symbol_by_address.insert(token.address, token.symbol.clone());
        tables.by_symbol.insert(token.symbol.clone(), token);
        Ok(())
    }

    /// Look up a token by its symbol.
    pub fn lookup_by_symbol(&self, symbol: &str) -> RegistryResult<Token> {
        self.inner
            .read()
            .by_symbol
            .get(symbol)
            .cloned()
            .ok_or_else(|| RegistryError::TokenNotFound { symbol: symbol.to_string() })
    }

    /// Look up a token by its address.
    pub fn lookup_by_address(&self, address: &Address) -> RegistryResult<Token> {
        let tables = self.inner.read();
        tables
            .symbol_by_address
            .get(address)
            .and_then(|symbol| tables.by_symbol.get(symbol))
            .cloned()
            .ok_or(RegistryError::TokenAddressNotFound { address: *address })
    }

    /// Point-in-time snapshot of all tokens, sorted by symbol.
    pub fn list_all(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self.inner.read().by_symbol.values().cloned().collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }

    /// Point-in-time snapshot of all token symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.inner.read().by_symbol.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Replace the gas fee estimate of a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenNotFound` if no token has the given symbol.
    pub fn update_gas_fee(&self, symbol: &str, gas_fee: Option<BigDecimal>) -> RegistryResult<()> {
        let mut tables = self.inner.write();
        let token = tables
            .by_symbol
            .get_mut(symbol)
            .ok_or_else(|| RegistryError::TokenNotFound { symbol: symbol.to_string() })?;
        token.gas_fee_estimate = gas_fee;
        Ok(())
    }

    /// Remove a token by symbol, returning it.
    pub fn remove(&self, symbol: &str) -> RegistryResult<Token> {
        let mut tables = self.inner.write();
        let token = tables
            .by_symbol
            .remove(symbol)
            .ok_or_else(|| RegistryError::TokenNotFound { symbol: symbol.to_string() })?;
        tables.symbol_by_address.remove(&token.address);
        Ok(token)
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
