//! Atomic Composition Router
//!
//! Single-deploy convenience surface that chains a wrap with a borrow (or a
//! repay with an unwrap) against the external lending connector. The router
//! holds no durable state beyond its three bound references and never
//! retains a custody or claim balance once a call completes; any revert in
//! any leg rolls back the whole deploy.

use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{runtime_args, Key, RuntimeArgs, U256};
use odra::prelude::*;
use odra::CallDef;

use crate::batch::UnitOfWork;
use crate::errors::WrapError;
use crate::events::{DepositAndBorrow, RepayAndWithdraw};

/// Atomic Composition Router Contract
#[odra::module]
pub struct Router {
    /// Vault registry used to resolve position ids to wrap vaults
    registry: Var<Address>,
    /// Position ledger the wrap vaults custody units of
    custody_asset: Var<Address>,
    /// Batch connector fronting the external lending markets
    connector: Var<Address>,
}

#[odra::module]
impl Router {
    /// Initialize the router with its bound references.
    /// Uses Key instead of Address to allow deployment via casper-client.
    pub fn init(&mut self, registry: Key, custody_asset: Key, connector: Key) {
        let registry_addr = match Address::try_from(registry) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        let custody_addr = match Address::try_from(custody_asset) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        let connector_addr = match Address::try_from(connector) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        self.registry.set(registry_addr);
        self.custody_asset.set(custody_addr);
        self.connector.set(connector_addr);
    }

    // ========== Composed Flows ==========

    /// Wrap a position and lever it in one deploy: pull custody units from
    /// the caller, deposit them for claim tokens minted to the caller, then
    /// enable the claim collateral and borrow to the caller through the
    /// connector. `borrow_amount` of zero skips the batch entirely.
    pub fn deposit_and_borrow(
        &mut self,
        position_id: U256,
        deposit_amount: U256,
        borrow_vault: Address,
        borrow_amount: U256,
    ) {
        if deposit_amount.is_zero() {
            self.env().revert(WrapError::InvalidAmount);
        }
        let caller = self.env().caller();
        let vault = self.resolve_vault(position_id);

        self.deposit_into_vault(caller, vault, position_id, deposit_amount);

        if !borrow_amount.is_zero() {
            let mut work = UnitOfWork::new();
            work.enable_collateral(caller, vault);
            work.enable_controller(caller, borrow_vault);
            work.borrow(caller, borrow_vault, borrow_amount, caller);
            self.submit_batch(work);
        }

        self.env().emit_event(DepositAndBorrow {
            account: caller,
            vault,
            deposit_amount,
            borrow_amount,
        });
    }

    /// Unwind in one deploy: repay debt on the lending vault, then burn the
    /// caller's claim tokens and return the custody units. Either leg may be
    /// zero. A `repay_amount` of `U256::MAX` repays the caller's full live
    /// debt.
    pub fn repay_and_withdraw(
        &mut self,
        position_id: U256,
        repay_vault: Address,
        repay_amount: U256,
        withdraw_amount: U256,
    ) {
        let caller = self.env().caller();
        let vault = self.resolve_vault(position_id);

        let repaid = if repay_amount.is_zero() {
            U256::zero()
        } else {
            self.repay_debt(caller, repay_vault, repay_amount)
        };

        if !withdraw_amount.is_zero() {
            self.withdraw_from_vault(caller, vault, withdraw_amount);
        }

        self.env().emit_event(RepayAndWithdraw {
            account: caller,
            vault,
            repay_amount: repaid,
            withdraw_amount,
        });
    }

    /// Deposit leg only, optionally flagging the claim tokens as collateral
    pub fn deposit_only(&mut self, position_id: U256, amount: U256, enable_as_collateral: bool) {
        if amount.is_zero() {
            self.env().revert(WrapError::InvalidAmount);
        }
        let caller = self.env().caller();
        let vault = self.resolve_vault(position_id);

        self.deposit_into_vault(caller, vault, position_id, amount);

        if enable_as_collateral {
            let args = runtime_args! {
                "account" => caller,
                "vault" => vault,
            };
            let call_def = CallDef::new("enable_collateral", true, args);
            self.env().call_contract::<()>(self.get_connector(), call_def);
        }

        self.env().emit_event(DepositAndBorrow {
            account: caller,
            vault,
            deposit_amount: amount,
            borrow_amount: U256::zero(),
        });
    }

    /// Withdraw leg only
    pub fn withdraw_only(&mut self, position_id: U256, amount: U256) {
        if amount.is_zero() {
            self.env().revert(WrapError::InvalidAmount);
        }
        let caller = self.env().caller();
        let vault = self.resolve_vault(position_id);

        self.withdraw_from_vault(caller, vault, amount);

        self.env().emit_event(RepayAndWithdraw {
            account: caller,
            vault,
            repay_amount: U256::zero(),
            withdraw_amount: amount,
        });
    }

    // ========== Read-only Getters ==========

    /// Resolve the wrap vault for a position id, if registered
    pub fn get_vault(&self, position_id: U256) -> Option<Address> {
        let args = runtime_args! { "position_id" => position_id };
        let call_def = CallDef::new("get_vault", false, args);
        self.env().call_contract(self.get_registry(), call_def)
    }

    /// Claim token balance a user holds in a position's wrap vault
    pub fn get_user_shares(&self, position_id: U256, user: Address) -> U256 {
        let vault = self.resolve_vault(position_id);
        let args = runtime_args! { "account" => user };
        let call_def = CallDef::new("balance_of", false, args);
        self.env().call_contract(vault, call_def)
    }

    /// Live debt a user owes on a lending vault
    pub fn get_user_debt(&self, user: Address, lending_vault: Address) -> U256 {
        let args = runtime_args! { "account" => user };
        let call_def = CallDef::new("debt_of", false, args);
        self.env().call_contract(lending_vault, call_def)
    }

    /// Get the registry address
    pub fn get_registry(&self) -> Address {
        match self.registry.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    /// Get the position ledger address
    pub fn get_custody_asset(&self) -> Address {
        match self.custody_asset.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    /// Get the batch connector address
    pub fn get_connector(&self) -> Address {
        match self.connector.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    // ========== Receiver Hooks ==========

    /// Accept any position delivery; the router only ever holds units
    /// transiently inside one of its own calls
    pub fn on_position_received(
        &mut self,
        _operator: Address,
        _from: Address,
        _id: U256,
        _amount: U256,
        _data: Bytes,
    ) -> bool {
        true
    }

    /// Batched form of the delivery hook
    pub fn on_position_batch_received(
        &mut self,
        _operator: Address,
        _from: Address,
        _ids: Vec<U256>,
        _amounts: Vec<U256>,
        _data: Bytes,
    ) -> bool {
        true
    }

    // ========== Internal Functions ==========

    fn resolve_vault(&self, position_id: U256) -> Address {
        match self.get_vault(position_id) {
            Some(vault) => vault,
            None => self.env().revert(WrapError::VaultNotFound),
        }
    }

    /// Pull custody units from `account`, let the vault take them from the
    /// router, and mint the claim tokens straight to `account`.
    fn deposit_into_vault(
        &mut self,
        account: Address,
        vault: Address,
        position_id: U256,
        amount: U256,
    ) {
        let custody = self.get_custody_asset();
        let self_addr = self.env().self_address();

        let pull_args = runtime_args! {
            "from" => account,
            "to" => self_addr,
            "id" => position_id,
            "amount" => amount,
            "data" => Bytes::from(Vec::new()),
        };
        let pull_call = CallDef::new("safe_transfer_from", true, pull_args);
        self.env().call_contract::<()>(custody, pull_call);

        let approve_args = runtime_args! {
            "operator" => vault,
            "approved" => true,
        };
        let approve_call = CallDef::new("set_approval_for_all", true, approve_args);
        self.env().call_contract::<()>(custody, approve_call);

        let deposit_args = runtime_args! {
            "amount" => amount,
            "receiver" => account,
        };
        let deposit_call = CallDef::new("deposit", true, deposit_args);
        self.env().call_contract::<U256>(vault, deposit_call);
    }

    /// Pull the caller's claim tokens (prior allowance required) and unwrap
    /// them back to the caller. The vault runs the account status check on
    /// the router, which carries no debt.
    fn withdraw_from_vault(&mut self, account: Address, vault: Address, amount: U256) {
        let self_addr = self.env().self_address();

        let pull_args = runtime_args! {
            "owner" => account,
            "recipient" => self_addr,
            "amount" => amount,
        };
        let pull_call = CallDef::new("transfer_from", true, pull_args);
        let success: bool = self.env().call_contract(vault, pull_call);
        if !success {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        let withdraw_args = runtime_args! {
            "amount" => amount,
            "owner" => self_addr,
            "receiver" => account,
        };
        let withdraw_call = CallDef::new("withdraw", true, withdraw_args);
        self.env().call_contract::<U256>(vault, withdraw_call);
    }

    /// Pull the repay asset from `account`, approve the lending vault for it
    /// and submit a single-item repay batch on the account's behalf. Returns
    /// the amount actually pulled and repaid.
    fn repay_debt(&mut self, account: Address, repay_vault: Address, repay_amount: U256) -> U256 {
        let amount = if repay_amount == U256::MAX {
            let debt_args = runtime_args! { "account" => account };
            let debt_call = CallDef::new("debt_of", false, debt_args);
            self.env().call_contract::<U256>(repay_vault, debt_call)
        } else {
            repay_amount
        };
        if amount.is_zero() {
            return U256::zero();
        }

        let asset_call = CallDef::new("asset", false, RuntimeArgs::new());
        let repay_asset: Address = self.env().call_contract(repay_vault, asset_call);

        let self_addr = self.env().self_address();
        let pull_args = runtime_args! {
            "owner" => account,
            "recipient" => self_addr,
            "amount" => amount,
        };
        let pull_call = CallDef::new("transfer_from", true, pull_args);
        let success: bool = self.env().call_contract(repay_asset, pull_call);
        if !success {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        let approve_args = runtime_args! {
            "spender" => repay_vault,
            "amount" => amount,
        };
        let approve_call = CallDef::new("approve", true, approve_args);
        self.env().call_contract::<bool>(repay_asset, approve_call);

        let mut work = UnitOfWork::new();
        work.repay(account, repay_vault, amount, self_addr);
        self.submit_batch(work);

        amount
    }

    fn submit_batch(&mut self, work: UnitOfWork) {
        let args = runtime_args! { "items" => work.into_items() };
        let call_def = CallDef::new("batch", true, args);
        self.env().call_contract::<()>(self.get_connector(), call_def);
    }
}
