use crate::registry::Venue;
use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::One;
use std::fmt;
use uuid::Uuid;

/// One directed hop of a triangular cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub from: String,
    pub to: String,
    pub pool: Address,
    pub venue: Venue,
    /// Unit-input output amount the pool offered when the cycle was found
    pub amount_out: BigDecimal,
}

/// A detected cycle A → B → C → A whose compounded output beats the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageOpportunity {
    pub id: Uuid,
    /// Tokens in traversal order; the cycle returns to `tokens[0]`
    pub tokens: [String; 3],
    pub legs: [Leg; 3],
    /// Product of the three legs' unit-input outputs
    pub multiplier: BigDecimal,
    /// Block of the event that triggered the scan
    pub block_number: u64,
    pub detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    pub fn new(legs: [Leg; 3], multiplier: BigDecimal, block_number: u64) -> Self {
        let tokens = [legs[0].from.clone(), legs[1].from.clone(), legs[2].from.clone()];
        Self {
            id: Uuid::new_v4(),
            tokens,
            legs,
            multiplier,
            block_number,
            detected_at: Utc::now(),
        }
    }

    /// Relative gain of one pass around the cycle, `multiplier - 1`.
    pub fn profit(&self) -> BigDecimal {
        &self.multiplier - BigDecimal::one()
    }

    /// Pools traversed, in order.
    pub fn pools(&self) -> [Address; 3] {
        [self.legs[0].pool, self.legs[1].pool, self.legs[2].pool]
    }
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} -> {} -> {} x{} (block {})",
            self.tokens[0],
            self.tokens[1],
            self.tokens[2],
            self.tokens[0],
            self.multiplier.with_prec(12),
            self.block_number
        )
    }
}
