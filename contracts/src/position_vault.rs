//! Position Wrapping Vault Contract
//!
//! Wraps one specific prediction-market position into a fungible,
//! transferable claim token at a permanently fixed 1:1 exchange rate.
//! CEP-18 compatible share token plus custody logic:
//! - `deposit` pulls bound-id units from the caller and mints claim tokens
//! - `withdraw` burns claim tokens and releases custodied units, then runs
//!   the connector's account status check against the owner
//! - the receiver hook rejects any incoming transfer with a foreign id
//!
//! Standing invariant: `total_assets() == total_supply()` after every
//! operation. No rebasing, no fee skim.

use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::{runtime_args, Key, U256};
use odra::prelude::*;
use odra::CallDef;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::errors::WrapError;
use crate::events::{Deposit, Withdrawal};

/// Claim token decimals (mirrors the custody ledger's unit scale)
const DECIMALS: u8 = 18;
const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// Position Wrapping Vault Contract
#[odra::module]
pub struct PositionVault {
    /// Bound position id, immutable after init
    position_id: Var<U256>,
    /// Custody asset (multi-instance position ledger)
    custody_asset: Var<Address>,
    /// Batching connector (account status checks)
    connector: Var<Address>,
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Claim token supply
    total_supply: Var<U256>,
    /// Units pulled into custody through deposit
    total_custody: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner -> spender -> amount)
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl PositionVault {
    /// Initialize the vault bound to one position id.
    /// Uses Key instead of Address to allow deployment via casper-client.
    pub fn init(
        &mut self,
        position_id: U256,
        name: String,
        symbol: String,
        custody_asset: Key,
        connector: Key,
    ) {
        let custody_addr = match Address::try_from(custody_asset) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        let connector_addr = match Address::try_from(connector) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };

        self.position_id.set(position_id);
        self.custody_asset.set(custody_addr);
        self.connector.set(connector_addr);
        self.name.set(name.clone());
        self.symbol.set(symbol.clone());
        self.total_supply.set(U256::zero());
        self.total_custody.set(U256::zero());

        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, name);
        self.env().set_named_value(CEP18_SYMBOL_KEY, symbol);
        self.env().set_named_value(CEP18_DECIMALS_KEY, DECIMALS);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
    }

    // ========== Vault Functions ==========

    /// Wrap `amount` units of the bound position into claim tokens.
    ///
    /// Pulls the units from the caller (requires prior approval on the
    /// custody ledger) and mints `amount` claim tokens to `receiver`.
    /// Returns the shares issued, always equal to `amount`.
    pub fn deposit(&mut self, amount: U256, receiver: Address) -> U256 {
        if amount.is_zero() {
            self.env().revert(WrapError::InvalidAmount);
        }

        let caller = self.env().caller();
        self.pull_position_units(caller, amount);

        let custody = self.total_custody();
        self.total_custody.set(custody + amount);
        self.mint_internal(receiver, amount);

        self.env().emit_event(Deposit {
            receiver,
            position_id: self.position_id(),
            amount,
        });

        amount
    }

    /// Unwrap `amount` claim tokens back into position units.
    ///
    /// Burns from `owner` (spending the caller's allowance when caller is
    /// not the owner), transfers the custodied units to `receiver`, then
    /// asks the connector to verify `owner`'s account status. A failed
    /// status check aborts the whole operation. Returns the shares burned.
    pub fn withdraw(&mut self, amount: U256, owner: Address, receiver: Address) -> U256 {
        if amount.is_zero() {
            self.env().revert(WrapError::InvalidAmount);
        }

        let caller = self.env().caller();
        if caller != owner {
            let current_allowance = self.allowance(owner, caller);
            if current_allowance < amount {
                self.env().revert(WrapError::InsufficientAllowance);
            }
            self.approve_internal(owner, caller, current_allowance - amount);
        }

        self.burn_internal(owner, amount);

        let custody = self.total_custody();
        if custody < amount {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }
        self.total_custody.set(custody - amount);

        self.push_position_units(receiver, amount);

        // Solvency gate runs after burn and transfer have applied; the
        // check targets the owner, never the receiver.
        self.require_account_status_check(owner);

        self.env().emit_event(Withdrawal {
            owner,
            receiver,
            position_id: self.position_id(),
            amount,
        });

        amount
    }

    /// Custodied position units; equals the claim token supply at all times
    pub fn total_assets(&self) -> U256 {
        self.total_custody()
    }

    /// The custody asset this vault wraps
    pub fn asset(&self) -> Address {
        match self.custody_asset.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    /// The bound position id
    pub fn position_id(&self) -> U256 {
        self.position_id.get().unwrap_or(U256::zero())
    }

    /// Get the batching connector address
    pub fn get_connector(&self) -> Address {
        match self.connector.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    // ========== Receiver Hooks ==========

    /// Custody ledger delivery hook. The single choke point where incoming
    /// transfers are matched against the bound id.
    pub fn on_position_received(
        &mut self,
        _operator: Address,
        _from: Address,
        id: U256,
        _amount: U256,
        _data: Bytes,
    ) -> bool {
        self.require_bound_id(id);
        true
    }

    /// Batched form of the delivery hook
    pub fn on_position_batch_received(
        &mut self,
        _operator: Address,
        _from: Address,
        ids: Vec<U256>,
        _amounts: Vec<U256>,
        _data: Bytes,
    ) -> bool {
        for id in ids {
            self.require_bound_id(id);
        }
        true
    }

    // ========== CEP-18 Standard Functions ==========

    /// Get token name
    pub fn name(&self) -> String {
        self.name.get().unwrap_or_default()
    }

    /// Get token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    /// Get decimals
    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Get total claim token supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get claim token balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer claim tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend claim tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer claim tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(WrapError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Internal Functions ==========

    fn total_custody(&self) -> U256 {
        self.total_custody.get().unwrap_or(U256::zero())
    }

    fn require_bound_id(&self, id: U256) {
        if id != self.position_id() {
            self.env().revert(WrapError::InvalidPositionId);
        }
    }

    fn pull_position_units(&self, from: Address, amount: U256) {
        let args = runtime_args! {
            "from" => from,
            "to" => self.env().self_address(),
            "id" => self.position_id(),
            "amount" => amount,
            "data" => Bytes::from(Vec::new()),
        };
        let call_def = CallDef::new("safe_transfer_from", true, args);
        self.env().call_contract::<()>(self.asset(), call_def);
    }

    fn push_position_units(&self, to: Address, amount: U256) {
        let args = runtime_args! {
            "from" => self.env().self_address(),
            "to" => to,
            "id" => self.position_id(),
            "amount" => amount,
            "data" => Bytes::from(Vec::new()),
        };
        let call_def = CallDef::new("safe_transfer_from", true, args);
        self.env().call_contract::<()>(self.asset(), call_def);
    }

    fn require_account_status_check(&self, account: Address) {
        let args = runtime_args! { "account" => account };
        let call_def = CallDef::new("require_account_status_check", false, args);
        self.env().call_contract::<()>(self.get_connector(), call_def);
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let to_balance = self.balance_of(to);
        let new_to_balance = to_balance + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.set_allowance_cep18(owner, spender, amount);
    }

    fn mint_internal(&mut self, to: Address, amount: U256) {
        let new_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn burn_internal(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(WrapError::InsufficientTokenBalance);
        }

        let new_balance = current_balance - amount;
        self.balances.set(&from, new_balance);
        self.set_balance_cep18(from, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.set_total_supply_cep18(new_supply);
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn set_allowance_cep18(&self, owner: Address, spender: Address, amount: U256) {
        let key = Self::cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_total_supply_cep18(&self, amount: U256) {
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let key = Key::from(owner);
        let bytes = key.to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let owner_key = Key::from(owner);
        let spender_key = Key::from(spender);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&owner_key.to_bytes().unwrap_or_default());
        bytes.extend_from_slice(&spender_key.to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }
}
