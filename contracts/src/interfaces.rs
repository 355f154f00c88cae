//! External collaborator interfaces.
//!
//! The protocol reaches three external components through narrow surfaces:
//! the CEP-85-style multi-token ledger that custodies raw positions, the
//! lending engine's debt vaults, and the batching connector that executes
//! multi-step operations atomically and performs account status checks.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::prelude::*;

use crate::batch::BatchItem;

/// Multi-instance position ledger (custody asset, CEP-85-style).
///
/// One balance per (account, position id). Transfers into a contract invoke
/// its receiver hook, which is where the wrapping vault enforces id matching.
#[odra::external_contract]
pub trait PositionLedger {
    fn balance_of(&self, account: Address, id: U256) -> U256;
    fn safe_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
        data: Bytes,
    );
    fn set_approval_for_all(&mut self, operator: Address, approved: bool);
}

/// External lending engine debt vault.
///
/// Interest accrual and liquidation live behind this surface and are not
/// specified here.
#[odra::external_contract]
pub trait LendingVault {
    fn borrow(&mut self, amount: U256, receiver: Address) -> U256;
    fn repay(&mut self, amount: U256, payer: Address) -> U256;
    fn debt_of(&self, account: Address) -> U256;
    fn asset(&self) -> Address;
}

/// Batching connector.
///
/// Executes an ordered list of operations as one all-or-nothing unit, tracks
/// collateral/controller registrations per account, and vetoes withdrawals
/// that would leave an account under-collateralized.
#[odra::external_contract]
pub trait BatchConnector {
    fn batch(&mut self, items: Vec<BatchItem>);
    fn enable_collateral(&mut self, account: Address, vault: Address);
    fn enable_controller(&mut self, account: Address, vault: Address);
    fn require_account_status_check(&self, account: Address);
}

/// CEP-18 fungible token surface (repay asset)
#[odra::external_contract]
pub trait FungibleToken {
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn balance_of(&self, account: Address) -> U256;
}
