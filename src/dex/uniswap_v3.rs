//! Uniswap V3 family adapter.
//!
//! SushiSwap V3 pools are Uniswap V3 forks with the same `Swap` event, so one
//! adapter type serves both venues.

use super::events::uniswap_v3::Swap;
use super::{DexAdapter, RawSwap};
use crate::errors::DexError;
use crate::registry::Venue;
use crate::DexResult;
use alloy::primitives::{B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

#[derive(Debug, Clone, Copy)]
pub struct UniswapV3Adapter {
    venue: Venue,
}

impl UniswapV3Adapter {
    pub fn new(venue: Venue) -> Self {
        Self { venue }
    }
}

impl DexAdapter for UniswapV3Adapter {
    fn venue(&self) -> Venue {
        self.venue
    }

    fn swap_topic(&self) -> B256 {
        Swap::SIGNATURE_HASH
    }

    fn decode_swap(&self, log: &Log) -> DexResult<RawSwap> {
        let decoded = log.log_decode::<Swap>().map_err(|e| DexError::DecodeFailed {
            venue: self.venue.to_string(),
            pool: log.address(),
            message: e.to_string(),
        })?;

        RawSwap::from_log(log, U256::from(decoded.inner.data.sqrtPriceX96))
    }
}
