//! Utility functions and type conversions for blockchain operations.
//!
//! This module bridges the type systems used throughout the library: Alloy's
//! fixed-width integers and addresses on the node side, `num-bigint` and
//! `bigdecimal` on the pricing side, and `chrono` for wall-clock latency.
//!
//! All conversion functions handle edge cases and return typed errors instead of
//! panicking, so malformed data is caught at the boundary.

use crate::errors::{Result, UtilityError};
use alloy::primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};
use num_bigint::BigUint;
use std::str::FromStr;

/// Parse a string representation of an Ethereum address.
///
/// Accepts addresses with or without the "0x" prefix, in any letter case.
///
/// # Errors
///
/// Returns an error if the string is not exactly 40 hex characters after the
/// optional prefix is removed.
pub fn string_to_address(s: &str) -> Result<Address> {
    Address::from_str(s.trim_start_matches("0x"))
        .map_err(|source| UtilityError::AddressParsingFailed {
            input: s.to_string(),
            source: alloy::primitives::AddressError::Hex(source),
        }.into())
}

/// Convert a U256 value to a BigUint.
///
/// Lossless conversion from Alloy's U256 type to num-bigint's BigUint, used to
/// hand raw sqrt prices to the normalizer.
pub fn u256_to_biguint(val: U256) -> BigUint {
    BigUint::from_bytes_be(&val.to_be_bytes::<32>())
}

/// Latency between a block's timestamp and the moment its event was observed.
///
/// The result is signed: a node clock ahead of ours yields a negative latency
/// rather than an error.
///
/// # Errors
///
/// Returns an error if the block timestamp cannot be represented as a date.
pub fn block_latency(observed_at: DateTime<Utc>, block_timestamp: u64) -> Result<Duration> {
    let secs = i64::try_from(block_timestamp)
        .map_err(|_| UtilityError::TimestampOutOfRange { timestamp: block_timestamp })?;
    let block_time = DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or(UtilityError::TimestampOutOfRange { timestamp: block_timestamp })?;

    Ok(observed_at - block_time)
}
