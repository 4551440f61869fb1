//! Price normalization for square-root fixed-point venue prices.
//!
//! Concentrated-liquidity venues report the pool price as `sqrt(token1/token0)`
//! in Q64.96 fixed point. `normalize_price` turns that raw value, the pool fee
//! and both tokens' decimals into the two unit-input output amounts the engine
//! works with.
//!
//! All arithmetic is done on arbitrary-precision decimals: decimal differences
//! of up to 18 orders of magnitude combined with a 2^192 divisor are well past
//! what an `f64` can carry without cancellation.

use crate::errors::PricingError;
use crate::PricingResult;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

/// Fee units per whole for every supported venue (fee 500 = 0.05%).
pub const FEE_UNITS_PER_WHOLE: u32 = 1_000_000;

/// Significant digits kept in normalized amounts.
pub const PRICE_PRECISION: u64 = 50;

/// Fractional bits of the Q64.96 sqrt price encoding.
const Q96_BITS: usize = 96;

/// Unit-input output amounts in both directions of a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPrice {
    /// Token1 received for exactly one token0, net of fee
    pub forward: BigDecimal,
    /// Token0 received for exactly one token1, net of fee
    pub backward: BigDecimal,
}

/// Undo the square-root fixed-point encoding: `(sqrt_price / 2^96)^2`.
pub fn price_ratio(sqrt_price_x96: &BigUint) -> BigDecimal {
    let squared = BigInt::from(sqrt_price_x96 * sqrt_price_x96);
    let q192 = BigInt::one() << (2 * Q96_BITS);

    BigDecimal::from(squared) / BigDecimal::from(q192)
}

/// Scale a raw ratio by `10^(decimals0 - decimals1)`.
pub fn adjust_for_decimals(ratio: &BigDecimal, decimals0: u8, decimals1: u8) -> BigDecimal {
    let exponent = i64::from(decimals0) - i64::from(decimals1);
    // BigDecimal::new(d, s) is d * 10^-s
    ratio * BigDecimal::new(BigInt::one(), -exponent)
}

/// Share of the input that is left after the venue fee: `1 - fee_units / fee_scale`.
///
/// # Errors
///
/// Returns `InvalidFee` if the scale is zero or the fee consumes the whole input.
pub fn net_input(fee_units: u32, fee_scale: u32) -> PricingResult<BigDecimal> {
    if fee_scale == 0 || fee_units >= fee_scale {
        return Err(PricingError::InvalidFee { fee_units, fee_scale });
    }
    let fee_fraction = BigDecimal::from(fee_units) / BigDecimal::from(fee_scale);
    Ok(BigDecimal::one() - fee_fraction)
}

/// Turn a venue sqrt price into unit-input output amounts in both directions.
///
/// 1. `ratio = (sqrt_price_x96 / 2^96)^2`
/// 2. `adjusted = ratio * 10^(decimals0 - decimals1)`
/// 3. `net = 1 - fee_units / fee_scale`
/// 4. `forward = net * adjusted`
/// 5. `backward = net * (1 / adjusted)`
///
/// The function is pure: identical inputs always produce identical outputs.
///
/// # Errors
///
/// - `InvalidPrice` if the adjusted price is not strictly positive
/// - `InvalidFee` if the fee leaves no input
pub fn normalize_price(
    sqrt_price_x96: &BigUint,
    fee_units: u32,
    fee_scale: u32,
    decimals0: u8,
    decimals1: u8,
) -> PricingResult<NormalizedPrice> {
    let adjusted = adjust_for_decimals(&price_ratio(sqrt_price_x96), decimals0, decimals1);
    if adjusted.is_zero() || !adjusted.is_positive() {
        return Err(PricingError::InvalidPrice { adjusted: adjusted.to_string() });
    }

    let net = net_input(fee_units, fee_scale)?;
    let forward = (&net * &adjusted).with_prec(PRICE_PRECISION);
    let backward = (&net * adjusted.inverse()).with_prec(PRICE_PRECISION);

    Ok(NormalizedPrice { forward, backward })
}
