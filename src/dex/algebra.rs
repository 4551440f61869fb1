//! Algebra adapter (QuickSwap V3).
//!
//! Algebra pools emit the sqrt price in a field called `price`; the encoding is
//! the same Q64.96 as Uniswap V3.

use super::events::algebra::Swap;
use super::{DexAdapter, RawSwap};
use crate::errors::DexError;
use crate::registry::Venue;
use crate::DexResult;
use alloy::primitives::{B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

#[derive(Debug, Clone, Copy)]
pub struct AlgebraAdapter {
    venue: Venue,
}

impl AlgebraAdapter {
    pub fn new(venue: Venue) -> Self {
        Self { venue }
    }
}

impl DexAdapter for AlgebraAdapter {
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

        RawSwap::from_log(log, U256::from(decoded.inner.data.price))
    }
}
