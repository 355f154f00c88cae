//! Atomic batch descriptors for the external connector.
//!
//! The router composes multi-party operations as an ordered list of typed
//! steps submitted to the connector's `batch` entry point as one indivisible
//! unit. Each item names the operation, the contract it targets, and the
//! account it acts on behalf of.

use odra::casper_types::U256;
use odra::prelude::*;

/// Operation kind within a batch
#[odra::odra_type]
#[derive(Copy)]
pub enum BatchOpKind {
    /// Mark `target` as usable collateral for `on_behalf_of`
    EnableCollateral,
    /// Mark `target` as the debt-tracking controller for `on_behalf_of`
    EnableController,
    /// Borrow `amount` from `target`, proceeds to `counterparty`
    Borrow,
    /// Repay `amount` of debt on `target`, funded by `counterparty`
    Repay,
}

/// One step in an atomic batch
#[odra::odra_type]
pub struct BatchItem {
    pub kind: BatchOpKind,
    /// Contract the operation targets (wrap vault or lending vault)
    pub target: Address,
    /// Account the operation acts on behalf of
    pub on_behalf_of: Address,
    /// Amount for borrow/repay, zero otherwise
    pub amount: U256,
    /// Receiver for borrow, payer for repay; `on_behalf_of` otherwise
    pub counterparty: Address,
}

/// Ordered collector for one atomic unit of work.
///
/// Step order is preserved exactly as pushed; the connector commits all
/// steps or none.
pub struct UnitOfWork {
    items: Vec<BatchItem>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn enable_collateral(&mut self, account: Address, vault: Address) {
        self.items.push(BatchItem {
            kind: BatchOpKind::EnableCollateral,
            target: vault,
            on_behalf_of: account,
            amount: U256::zero(),
            counterparty: account,
        });
    }

    pub fn enable_controller(&mut self, account: Address, vault: Address) {
        self.items.push(BatchItem {
            kind: BatchOpKind::EnableController,
            target: vault,
            on_behalf_of: account,
            amount: U256::zero(),
            counterparty: account,
        });
    }

    pub fn borrow(&mut self, account: Address, vault: Address, amount: U256, receiver: Address) {
        self.items.push(BatchItem {
            kind: BatchOpKind::Borrow,
            target: vault,
            on_behalf_of: account,
            amount,
            counterparty: receiver,
        });
    }

    pub fn repay(&mut self, account: Address, vault: Address, amount: U256, payer: Address) {
        self.items.push(BatchItem {
            kind: BatchOpKind::Repay,
            target: vault,
            on_behalf_of: account,
            amount,
            counterparty: payer,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_items(self) -> Vec<BatchItem> {
        self.items
    }
}

impl Default for UnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}
