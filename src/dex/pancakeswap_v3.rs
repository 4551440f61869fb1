//! PancakeSwap V3 adapter.

use super::events::pancake_v3::Swap;
use super::{DexAdapter, RawSwap};
use crate::errors::DexError;
use crate::registry::Venue;
use crate::DexResult;
use alloy::primitives::{B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

/// PancakeSwap V3 appends protocol fee amounts to the Uniswap V3 `Swap`
/// event, which changes its topic hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct PancakeswapV3Adapter;

impl PancakeswapV3Adapter {
    pub fn new() -> Self {
        Self
    }
}

impl DexAdapter for PancakeswapV3Adapter {
    fn venue(&self) -> Venue {
        Venue::PancakeswapV3
    }

    fn swap_topic(&self) -> B256 {
        Swap::SIGNATURE_HASH
    }

    fn decode_swap(&self, log: &Log) -> DexResult<RawSwap> {
        let decoded = log.log_decode::<Swap>().map_err(|e| DexError::DecodeFailed {
            venue: Venue::PancakeswapV3.to_string(),
            pool: log.address(),
            message: e.to_string(),
        })?;

        RawSwap::from_log(log, U256::from(decoded.inner.data.sqrtPriceX96))
    }
}
