//! Price Oracle Contract
//!
//! Stores one authoritative price record per wrapping vault, administrator
//! fed. Quotes are gated twice: an invalidated or never-set record fails
//! with `PriceNotSet`, a record older than the maximum staleness fails with
//! `StalePrice`. A read that cannot produce an economically meaningful
//! answer always fails loudly instead of returning a default.
//!
//! Two-sided quotes mark a mid price down/up by half the configured spread
//! (per-vault override, else protocol default).

use odra::casper_types::{Key, U256};
use odra::prelude::*;

use crate::errors::WrapError;
use crate::events::{
    DefaultSpreadUpdated, MaxStalenessUpdated, PriceInvalidated, PriceUpdated, SpreadUpdated,
};
use crate::types::{PriceRecord, QuotePair, MAX_SPREAD_BPS, PRICE_PRECISION, SPREAD_SIDE_DIVISOR};

/// Default maximum price age before quotes are refused (1 hour)
const DEFAULT_MAX_STALENESS: u64 = 3600;

/// Price Oracle Contract
#[odra::module]
pub struct PriceOracle {
    /// Administrator capability holder
    admin: Var<Address>,
    /// Price record per vault
    prices: Mapping<Address, PriceRecord>,
    /// Per-vault spread override in bps (absent = use default)
    spreads: Mapping<Address, u32>,
    /// Protocol-wide default spread in bps
    default_spread_bps: Var<u32>,
    /// Maximum quote staleness in seconds
    max_staleness: Var<u64>,
}

#[odra::module]
impl PriceOracle {
    /// Initialize the oracle with its administrator.
    /// Uses Key instead of Address to allow deployment via casper-client.
    pub fn init(&mut self, admin: Key) {
        let admin_addr = match Address::try_from(admin) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        self.admin.set(admin_addr);
        self.default_spread_bps.set(0);
        self.max_staleness.set(DEFAULT_MAX_STALENESS);
    }

    /// Oracle name for external valuation consumers
    pub fn name(&self) -> String {
        String::from("WrappedPositionOracle")
    }

    // ========== Price Update Functions (admin only) ==========

    /// Set the price for a vault, overwriting any prior record
    pub fn set_price(&mut self, vault: Address, price: U256) {
        self.require_admin();
        self.set_price_internal(vault, price);
    }

    /// Batch form of `set_price`; all entries are set or the call fails
    pub fn set_prices(&mut self, vaults: Vec<Address>, prices: Vec<U256>) {
        self.require_admin();

        if vaults.len() != prices.len() {
            self.env().revert(WrapError::ArrayLengthMismatch);
        }
        // Validate everything before the first write
        for price in &prices {
            if price.is_zero() {
                self.env().revert(WrapError::InvalidPrice);
            }
        }

        for (vault, price) in vaults.into_iter().zip(prices.into_iter()) {
            self.set_price_internal(vault, price);
        }
    }

    /// Flag a record invalid, e.g. on market settlement. The last price and
    /// timestamp stay inspectable; quotes refuse the record until a new
    /// price is set.
    pub fn invalidate_price(&mut self, vault: Address) {
        self.require_admin();

        let mut record = match self.prices.get(&vault) {
            Some(record) => record,
            None => self.env().revert(WrapError::PriceNotSet),
        };
        record.is_valid = false;
        self.prices.set(&vault, record);

        self.env().emit_event(PriceInvalidated { vault });
    }

    // ========== Spread / Staleness Configuration (admin only) ==========

    /// Set a per-vault spread override in bps
    pub fn set_spread(&mut self, vault: Address, spread_bps: u32) {
        self.require_admin();
        if spread_bps > MAX_SPREAD_BPS {
            self.env().revert(WrapError::InvalidSpread);
        }
        self.spreads.set(&vault, spread_bps);
        self.env().emit_event(SpreadUpdated { vault, spread_bps });
    }

    /// Set the protocol-wide default spread in bps
    pub fn set_default_spread(&mut self, spread_bps: u32) {
        self.require_admin();
        if spread_bps > MAX_SPREAD_BPS {
            self.env().revert(WrapError::InvalidSpread);
        }
        self.default_spread_bps.set(spread_bps);
        self.env().emit_event(DefaultSpreadUpdated { spread_bps });
    }

    /// Set the maximum quote staleness in seconds
    pub fn set_max_staleness(&mut self, max_staleness: u64) {
        self.require_admin();
        self.max_staleness.set(max_staleness);
        self.env().emit_event(MaxStalenessUpdated { max_staleness });
    }

    /// Transfer the administrator capability
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.admin.set(new_admin);
    }

    // ========== Quote Functions ==========

    /// One-sided quote: value `in_amount` claim tokens of `base` in
    /// quote-asset smallest units. The quote asset is fixed per deployment;
    /// the argument exists for interface compatibility.
    pub fn get_quote(&self, in_amount: U256, base: Address, _quote: Address) -> U256 {
        let record = self.fresh_record(base);
        quote_out(in_amount, record.price)
    }

    /// Two-sided quote derived from the mid price and the vault's spread
    pub fn get_quotes(&self, in_amount: U256, base: Address, _quote: Address) -> QuotePair {
        let record = self.fresh_record(base);
        let mid = quote_out(in_amount, record.price);
        let spread_bps = self.spread_for(base);
        let (bid, ask) = apply_spread(mid, spread_bps);
        QuotePair { bid, ask }
    }

    /// Whether a vault's record would currently quote; no failure path
    pub fn is_price_fresh(&self, vault: Address) -> bool {
        match self.prices.get(&vault) {
            Some(record) => {
                record.is_valid
                    && is_fresh(
                        self.env().get_block_time(),
                        record.updated_at,
                        self.get_max_staleness(),
                    )
            }
            None => false,
        }
    }

    // ========== Read-only Getters ==========

    /// Raw price record for a vault, if any
    pub fn get_price_record(&self, vault: Address) -> Option<PriceRecord> {
        self.prices.get(&vault)
    }

    /// Per-vault spread override, if set
    pub fn get_spread(&self, vault: Address) -> Option<u32> {
        self.spreads.get(&vault)
    }

    /// Protocol-wide default spread in bps
    pub fn get_default_spread(&self) -> u32 {
        self.default_spread_bps.get().unwrap_or(0)
    }

    /// Maximum quote staleness in seconds
    pub fn get_max_staleness(&self) -> u64 {
        self.max_staleness.get().unwrap_or(DEFAULT_MAX_STALENESS)
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Check if caller is admin
    pub fn is_admin(&self, caller: Address) -> bool {
        self.admin.get().map_or(false, |admin| admin == caller)
    }

    // ========== Internal Functions ==========

    fn set_price_internal(&mut self, vault: Address, price: U256) {
        if price.is_zero() {
            self.env().revert(WrapError::InvalidPrice);
        }

        let old_price = self
            .prices
            .get(&vault)
            .map(|record| record.price)
            .unwrap_or(U256::zero());

        self.prices.set(
            &vault,
            PriceRecord {
                price,
                updated_at: self.env().get_block_time(),
                is_valid: true,
            },
        );

        self.env().emit_event(PriceUpdated {
            vault,
            old_price,
            new_price: price,
        });
    }

    /// Resolve a record that is set, valid and within staleness, or fail
    fn fresh_record(&self, vault: Address) -> PriceRecord {
        let record = match self.prices.get(&vault) {
            Some(record) => record,
            None => self.env().revert(WrapError::PriceNotSet),
        };
        if !record.is_valid {
            self.env().revert(WrapError::PriceNotSet);
        }
        if !is_fresh(
            self.env().get_block_time(),
            record.updated_at,
            self.get_max_staleness(),
        ) {
            self.env().revert(WrapError::StalePrice);
        }
        record
    }

    fn spread_for(&self, vault: Address) -> u32 {
        self.spreads
            .get(&vault)
            .unwrap_or_else(|| self.get_default_spread())
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if !self.is_admin(caller) {
            self.env().revert(WrapError::Unauthorized);
        }
    }
}

// ========== Quote Arithmetic ==========

/// out = in * price / PRICE_PRECISION, truncating
pub fn quote_out(in_amount: U256, price: U256) -> U256 {
    in_amount * price / U256::from(PRICE_PRECISION)
}

/// Derive (bid, ask) by halving the full spread onto each side of mid
pub fn apply_spread(mid: U256, spread_bps: u32) -> (U256, U256) {
    let side = mid * U256::from(spread_bps) / U256::from(SPREAD_SIDE_DIVISOR);
    (mid - side, mid + side)
}

/// A record quotes while its age has not exceeded the maximum staleness
pub fn is_fresh(now: u64, updated_at: u64, max_staleness: u64) -> bool {
    now.saturating_sub(updated_at) <= max_staleness
}
