//! Triangular cycle search over a best-quote snapshot.
//!
//! Every ordered triple of distinct symbols is a candidate cycle. Each leg is
//! priced with the best pool for its directed pair, read from the snapshot in
//! constant time, so one scan is O(T³) in the number of tokens.

use super::opportunity::{ArbitrageOpportunity, Leg};
use crate::pricing::PRICE_PRECISION;
use crate::registry::QuoteBook;
use bigdecimal::BigDecimal;
use itertools::Itertools;
use num_traits::One;
use rayon::prelude::*;

/// Basis points per whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Multiplier a cycle must strictly exceed: `1 + min_profit_bps / 10_000`.
pub fn profit_threshold(min_profit_bps: u32) -> BigDecimal {
    BigDecimal::one() + BigDecimal::from(min_profit_bps) / BigDecimal::from(BPS_DENOMINATOR)
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Ordered triples examined
    pub triples: usize,
    /// Triples with a quote for all three legs
    pub priced: usize,
    /// Triples above the threshold
    pub profitable: usize,
}

/// Result of pricing one complete cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCycle {
    pub legs: [Leg; 3],
    pub multiplier: BigDecimal,
}

/// Price the cycle `a → b → c → a`, or `None` if any leg has no quote.
pub fn price_cycle(quotes: &QuoteBook, a: &str, b: &str, c: &str) -> Option<PricedCycle> {
    let legs = [leg(quotes, a, b)?, leg(quotes, b, c)?, leg(quotes, c, a)?];
    let multiplier =
        (&legs[0].amount_out * &legs[1].amount_out * &legs[2].amount_out).with_prec(PRICE_PRECISION);

    Some(PricedCycle { legs, multiplier })
}

fn leg(quotes: &QuoteBook, from: &str, to: &str) -> Option<Leg> {
    let quote = quotes.get(&(from.to_string(), to.to_string()))?;
    Some(Leg {
        from: from.to_string(),
        to: to.to_string(),
        pool: quote.pool,
        venue: quote.venue,
        amount_out: quote.amount_out.clone(),
    })
}

/// Scan every ordered triple of distinct symbols for cycles above `threshold`.
///
/// `symbols` is expected sorted; results follow permutation order of that
/// slice regardless of how the work was split across threads. Rotations of the
/// same cycle are distinct triples and are all reported.
pub fn find_opportunities(
    symbols: &[String],
    quotes: &QuoteBook,
    threshold: &BigDecimal,
    block_number: u64,
) -> (Vec<ArbitrageOpportunity>, SearchStats) {
    let triples: Vec<Vec<&String>> = symbols.iter().permutations(3).collect();

    let priced: Vec<Option<PricedCycle>> = triples
        .par_iter()
        .map(|triple| price_cycle(quotes, triple[0], triple[1], triple[2]))
        .collect();

    let mut stats = SearchStats {
        triples: triples.len(),
        ..SearchStats::default()
    };

    let opportunities = priced
        .into_iter()
        .flatten()
        .inspect(|_| stats.priced += 1)
        .filter(|cycle| &cycle.multiplier > threshold)
        .map(|cycle| ArbitrageOpportunity::new(cycle.legs, cycle.multiplier, block_number))
        .collect::<Vec<_>>();

    stats.profitable = opportunities.len();
    (opportunities, stats)
}
