//! Common types used across the wrapped-position protocol.

use odra::casper_types::U256;
use odra::prelude::*;

/// Price precision constant (1e18). One unit of price precision values one
/// claim token in quote-asset smallest units.
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Maximum spread in basis points (50%)
pub const MAX_SPREAD_BPS: u32 = 5000;

/// Divisor applied when splitting a full spread onto each side of mid.
/// Spread bps express the full bid-ask width, so each side gets half.
pub const SPREAD_SIDE_DIVISOR: u32 = 20000;

/// Oracle price record for one wrapping vault
#[odra::odra_type]
pub struct PriceRecord {
    /// Price scaled by [`PRICE_PRECISION`]
    pub price: U256,
    /// Block time of the last update
    pub updated_at: u64,
    /// Cleared on invalidation; an invalid record never quotes
    pub is_valid: bool,
}

/// Two-sided quote derived from a mid price
#[odra::odra_type]
pub struct QuotePair {
    /// Mid marked down by half the spread
    pub bid: U256,
    /// Mid marked up by half the spread
    pub ask: U256,
}
