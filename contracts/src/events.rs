//! Events emitted by the wrapped-position protocol contracts.

use odra::casper_types::U256;
use odra::prelude::*;

/// A vault was bound to a position id in the registry
#[odra::event]
pub struct VaultCreated {
    pub position_id: U256,
    pub custody_asset: Address,
    pub vault: Address,
    pub name: String,
    pub symbol: String,
}

/// Position units wrapped into claim tokens
#[odra::event]
pub struct Deposit {
    pub receiver: Address,
    pub position_id: U256,
    pub amount: U256,
}

/// Claim tokens unwrapped back into position units
#[odra::event]
pub struct Withdrawal {
    pub owner: Address,
    pub receiver: Address,
    pub position_id: U256,
    pub amount: U256,
}

/// Oracle price set or overwritten for a vault
#[odra::event]
pub struct PriceUpdated {
    pub vault: Address,
    pub old_price: U256,
    pub new_price: U256,
}

/// Oracle record flagged invalid (history kept)
#[odra::event]
pub struct PriceInvalidated {
    pub vault: Address,
}

/// Per-vault spread override changed
#[odra::event]
pub struct SpreadUpdated {
    pub vault: Address,
    pub spread_bps: u32,
}

/// Protocol-wide default spread changed
#[odra::event]
pub struct DefaultSpreadUpdated {
    pub spread_bps: u32,
}

/// Maximum quote staleness changed
#[odra::event]
pub struct MaxStalenessUpdated {
    pub max_staleness: u64,
}

/// Combined deposit + borrow executed by the router
#[odra::event]
pub struct DepositAndBorrow {
    pub account: Address,
    pub vault: Address,
    pub deposit_amount: U256,
    pub borrow_amount: U256,
}

/// Combined repay + withdraw executed by the router
#[odra::event]
pub struct RepayAndWithdraw {
    pub account: Address,
    pub vault: Address,
    pub repay_amount: U256,
    pub withdraw_amount: U256,
}
