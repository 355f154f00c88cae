//! Registry contract binding position ids to wrapping vaults.
//!
//! One vault per position id, registered exactly once. The mapping is
//! permanent: entries are never reassigned and the vault list only grows.
//! Vault contracts are instantiated host-side and bound here, which is
//! where uniqueness and binding correctness are enforced.

use odra::casper_types::bytesrepr::FromBytes;
use odra::casper_types::{runtime_args, CLTyped, Key, U256};
use odra::prelude::*;
use odra::CallDef;

use crate::errors::WrapError;
use crate::events::VaultCreated;

/// Registry of position wrapping vaults
#[odra::module]
pub struct VaultRegistry {
    /// Shared custody asset (multi-instance position ledger)
    custody_asset: Var<Address>,
    /// Batching connector shared by all vaults
    connector: Var<Address>,
    /// Position id -> vault, permanent once set
    vaults: Mapping<U256, Address>,
    /// Append-only ordered vault list
    vault_list: Mapping<u64, Address>,
    /// Number of registered vaults
    vault_count: Var<u64>,
}

#[odra::module]
impl VaultRegistry {
    /// Initialize the registry with the shared custody asset and connector.
    /// Uses Key instead of Address to allow deployment via casper-client.
    pub fn init(&mut self, custody_asset: Key, connector: Key) {
        let custody_addr = match Address::try_from(custody_asset) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };
        let connector_addr = match Address::try_from(connector) {
            Ok(addr) => addr,
            Err(_) => self.env().revert(WrapError::InvalidAddress),
        };

        self.custody_asset.set(custody_addr);
        self.connector.set(connector_addr);
        self.vault_count.set(0);
    }

    /// Bind a freshly deployed vault to its position id.
    ///
    /// Anyone may call this; the position id itself gates what can be
    /// deposited. Fails if the id is already taken or the vault's own
    /// binding (position id, custody asset) disagrees with the registry.
    pub fn register_vault(&mut self, position_id: U256, vault: Address) {
        if self.vaults.get(&position_id).is_some() {
            self.env().revert(WrapError::VaultAlreadyExists);
        }

        let bound_id: U256 = self.call_vault(vault, "position_id");
        if bound_id != position_id {
            self.env().revert(WrapError::VaultMismatch);
        }

        let custody_asset = self.get_custody_asset();
        let vault_asset: Address = self.call_vault(vault, "asset");
        if vault_asset != custody_asset {
            self.env().revert(WrapError::VaultMismatch);
        }

        let count = self.vault_count.get().unwrap_or(0);
        self.vaults.set(&position_id, vault);
        self.vault_list.set(&count, vault);
        self.vault_count.set(count + 1);

        let name: String = self.call_vault(vault, "name");
        let symbol: String = self.call_vault(vault, "symbol");
        self.env().emit_event(VaultCreated {
            position_id,
            custody_asset,
            vault,
            name,
            symbol,
        });
    }

    /// Look up the vault for a position id
    pub fn get_vault(&self, position_id: U256) -> Option<Address> {
        self.vaults.get(&position_id)
    }

    /// All registered vaults in registration order
    pub fn get_all_vaults(&self) -> Vec<Address> {
        let count = self.vault_count.get().unwrap_or(0);
        let mut vaults = Vec::new();
        for index in 0..count {
            if let Some(vault) = self.vault_list.get(&index) {
                vaults.push(vault);
            }
        }
        vaults
    }

    /// Number of registered vaults
    pub fn vault_count(&self) -> u64 {
        self.vault_count.get().unwrap_or(0)
    }

    /// Get the shared custody asset address
    pub fn get_custody_asset(&self) -> Address {
        match self.custody_asset.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    /// Get the batching connector address
    pub fn get_connector(&self) -> Address {
        match self.connector.get() {
            Some(addr) => addr,
            None => self.env().revert(WrapError::InvalidConfig),
        }
    }

    fn call_vault<T: FromBytes + CLTyped>(&self, vault: Address, entry_point: &str) -> T {
        let call_def = CallDef::new(entry_point, false, runtime_args! {});
        self.env().call_contract(vault, call_def)
    }
}
