//! Core types stored in the registries.
//!
//! This module contains the fundamental types used throughout the watcher:
//! - Venue variants
//! - Token identity references and token records
//! - Pool records with their bidirectional exchange-rate state

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decentralized exchange protocol a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    UniswapV3,
    SushiswapV3,
    QuickswapV3,
    PancakeswapV3,
}

impl Venue {
    /// All supported venues.
    pub const ALL: [Venue; 4] = [
        Venue::UniswapV3,
        Venue::SushiswapV3,
        Venue::QuickswapV3,
        Venue::PancakeswapV3,
    ];

    /// Human-readable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Venue::UniswapV3 => "UniswapV3",
            Venue::SushiswapV3 => "SushiswapV3",
            Venue::QuickswapV3 => "QuickswapV3",
            Venue::PancakeswapV3 => "PancakeswapV3",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a token: the pair of keys the token registry is indexed by.
///
/// Pools hold `TokenKey`s instead of `Token`s so that mutable token state
/// (the gas fee estimate) is only ever read from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub symbol: String,
    pub address: Address,
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// An ERC-20 token known to the watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Ticker symbol, unique within the registry
    pub symbol: String,
    /// Deployment address, unique within the registry
    pub address: Address,
    /// Number of decimals of the token's base unit
    pub decimals: u8,
    /// Whether holding this token between cycles is considered safe
    pub holdable: bool,
    /// Latest gas fee estimate expressed in units of this token
    pub gas_fee_estimate: Option<BigDecimal>,
}

impl Token {
    pub fn new(symbol: impl Into<String>, address: Address, decimals: u8, holdable: bool) -> Self {
        Self {
            symbol: symbol.into(),
            address,
            decimals,
            holdable,
            gas_fee_estimate: None,
        }
    }

    /// Identity reference to this token
    pub fn key(&self) -> TokenKey {
        TokenKey {
            symbol: self.symbol.clone(),
            address: self.address,
        }
    }
}

/// A two-token liquidity pool on one venue.
///
/// `amount_out_forward` is the unit-input output for token0 → token1 and
/// `amount_out_backward` for token1 → token0. Both are `None` until the first
/// swap event for the pool has been processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub address: Address,
    pub venue: Venue,
    /// Fee in venue-native units (hundredths of a basis point for every supported venue)
    pub fee: u32,
    pub token0: TokenKey,
    pub token1: TokenKey,
    pub amount_out_forward: Option<BigDecimal>,
    pub amount_out_backward: Option<BigDecimal>,
    /// Block of the event that last wrote the amounts
    pub last_block: Option<u64>,
}

impl Pool {
    pub fn new(address: Address, venue: Venue, fee: u32, token0: TokenKey, token1: TokenKey) -> Self {
        Self {
            address,
            venue,
            fee,
            token0,
            token1,
            amount_out_forward: None,
            amount_out_backward: None,
            last_block: None,
        }
    }

    /// Both directional amounts, only when both have been populated.
    pub fn quotes(&self) -> Option<(&BigDecimal, &BigDecimal)> {
        match (&self.amount_out_forward, &self.amount_out_backward) {
            (Some(forward), Some(backward)) => Some((forward, backward)),
            _ => None,
        }
    }

    /// Unit-input output when swapping *from* the given token.
    ///
    /// Returns `None` if the token is not part of this pool or the pool has no
    /// complete quote yet.
    pub fn amount_out_from(&self, symbol: &str) -> Option<&BigDecimal> {
        let (forward, backward) = self.quotes()?;
        if self.token0.symbol == symbol {
            Some(forward)
        } else if self.token1.symbol == symbol {
            Some(backward)
        } else {
            None
        }
    }

    /// Unit-input output when swapping *to* the given token.
    pub fn amount_out_to(&self, symbol: &str) -> Option<&BigDecimal> {
        if self.token0.symbol == symbol {
            self.amount_out_from(&self.token1.symbol)
        } else if self.token1.symbol == symbol {
            self.amount_out_from(&self.token0.symbol)
        } else {
            None
        }
    }

    /// Whether this pool trades the unordered pair `{a, b}`.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.token0.symbol == a && self.token1.symbol == b)
            || (self.token0.symbol == b && self.token1.symbol == a)
    }

    /// Canonical unordered pair key for this pool's tokens.
    pub fn pair(&self) -> PairKey {
        PairKey::new(&self.token0.symbol, &self.token1.symbol)
    }
}

/// Unordered token pair, stored with the symbols sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Ordered token pair (`from` → `to`).
pub type DirectedPair = (String, String);

/// Best available quote for one directed pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BestQuote {
    /// Pool offering the quote
    pub pool: Address,
    /// Venue of that pool
    pub venue: Venue,
    /// Unit-input output amount in the quoted direction
    pub amount_out: BigDecimal,
}
