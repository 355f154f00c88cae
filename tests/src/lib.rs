//! PM-Wrap Integration Tests
//!
//! Test modules for the position wrapping system.

#[cfg(test)]
mod wrap_tests {
    use odra::casper_types::U256;
    use pm_wrap_contracts::errors::WrapError;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// Shadow model of a wrap vault: custody counter, claim supply,
    /// per-account balances and allowances evolving under the same rules
    /// as the contract.
    struct VaultModel {
        total_custody: U256,
        total_supply: U256,
        balances: BTreeMap<u8, U256>,
        allowances: BTreeMap<(u8, u8), U256>,
    }

    impl VaultModel {
        fn new() -> Self {
            Self {
                total_custody: U256::zero(),
                total_supply: U256::zero(),
                balances: BTreeMap::new(),
                allowances: BTreeMap::new(),
            }
        }

        fn balance_of(&self, account: u8) -> U256 {
            self.balances.get(&account).copied().unwrap_or_default()
        }

        fn allowance(&self, owner: u8, spender: u8) -> U256 {
            self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
        }

        fn approve(&mut self, owner: u8, spender: u8, amount: U256) {
            self.allowances.insert((owner, spender), amount);
        }

        fn deposit(&mut self, receiver: u8, amount: U256) -> Result<U256, WrapError> {
            if amount.is_zero() {
                return Err(WrapError::InvalidAmount);
            }
            self.total_custody += amount;
            self.total_supply += amount;
            let balance = self.balance_of(receiver);
            self.balances.insert(receiver, balance + amount);
            Ok(amount)
        }

        fn withdraw(&mut self, owner: u8, amount: U256) -> Result<U256, WrapError> {
            self.withdraw_from(owner, owner, amount)
        }

        /// Caller-aware withdraw: a non-owner caller spends exactly
        /// `amount` of the owner's allowance, as in the contract.
        fn withdraw_from(&mut self, caller: u8, owner: u8, amount: U256) -> Result<U256, WrapError> {
            if amount.is_zero() {
                return Err(WrapError::InvalidAmount);
            }
            if caller != owner {
                let current_allowance = self.allowance(owner, caller);
                if current_allowance < amount {
                    return Err(WrapError::InsufficientAllowance);
                }
                self.approve(owner, caller, current_allowance - amount);
            }
            let balance = self.balance_of(owner);
            if balance < amount {
                return Err(WrapError::InsufficientTokenBalance);
            }
            self.balances.insert(owner, balance - amount);
            self.total_supply -= amount;
            self.total_custody -= amount;
            Ok(amount)
        }

        fn transfer(&mut self, from: u8, to: u8, amount: U256) -> Result<(), WrapError> {
            let balance = self.balance_of(from);
            if balance < amount {
                return Err(WrapError::InsufficientTokenBalance);
            }
            self.balances.insert(from, balance - amount);
            let to_balance = self.balance_of(to);
            self.balances.insert(to, to_balance + amount);
            Ok(())
        }

        fn transfer_from(
            &mut self,
            spender: u8,
            owner: u8,
            to: u8,
            amount: U256,
        ) -> Result<(), WrapError> {
            let current_allowance = self.allowance(owner, spender);
            if current_allowance < amount {
                return Err(WrapError::InsufficientAllowance);
            }
            self.transfer(owner, to, amount)?;
            self.approve(owner, spender, current_allowance - amount);
            Ok(())
        }

        /// Custody always equals claim supply
        fn assert_solvent(&self) {
            assert_eq!(self.total_custody, self.total_supply);
        }
    }

    const ALICE: u8 = 1;
    const BOB: u8 = 2;

    #[test]
    fn test_deposit_mints_one_to_one() {
        let mut vault = VaultModel::new();
        let minted = vault.deposit(ALICE, U256::from(100u64)).unwrap();

        assert_eq!(minted, U256::from(100u64));
        assert_eq!(vault.balance_of(ALICE), U256::from(100u64));
        assert_eq!(vault.total_supply, U256::from(100u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_withdraw_burns_one_to_one() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();

        let returned = vault.withdraw(ALICE, U256::from(40u64)).unwrap();

        assert_eq!(returned, U256::from(40u64));
        assert_eq!(vault.balance_of(ALICE), U256::from(60u64));
        assert_eq!(vault.total_custody, U256::from(60u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_round_trip_restores_initial_state() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(1234u64)).unwrap();
        vault.withdraw(ALICE, U256::from(1234u64)).unwrap();

        assert!(vault.balance_of(ALICE).is_zero());
        assert!(vault.total_supply.is_zero());
        assert!(vault.total_custody.is_zero());
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let mut vault = VaultModel::new();
        assert_eq!(vault.deposit(ALICE, U256::zero()), Err(WrapError::InvalidAmount));
        assert_eq!(vault.withdraw(ALICE, U256::zero()), Err(WrapError::InvalidAmount));
    }

    #[test]
    fn test_withdraw_beyond_balance_rejected() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(50u64)).unwrap();

        let result = vault.withdraw(ALICE, U256::from(51u64));
        assert_eq!(result, Err(WrapError::InsufficientTokenBalance));
        // Nothing changed
        assert_eq!(vault.balance_of(ALICE), U256::from(50u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_transfers_preserve_supply() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();
        vault.transfer(ALICE, BOB, U256::from(30u64)).unwrap();

        assert_eq!(vault.balance_of(ALICE), U256::from(70u64));
        assert_eq!(vault.balance_of(BOB), U256::from(30u64));
        assert_eq!(vault.total_supply, U256::from(100u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_holder_can_redeem_received_claims() {
        // Claim tokens are fungible: Bob can redeem claims Alice minted
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();
        vault.transfer(ALICE, BOB, U256::from(100u64)).unwrap();

        let returned = vault.withdraw(BOB, U256::from(100u64)).unwrap();
        assert_eq!(returned, U256::from(100u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_non_owner_withdraw_requires_allowance() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();

        // No allowance granted
        let result = vault.withdraw_from(BOB, ALICE, U256::from(10u64));
        assert_eq!(result, Err(WrapError::InsufficientAllowance));

        // An allowance one short of the amount still fails
        vault.approve(ALICE, BOB, U256::from(9u64));
        let result = vault.withdraw_from(BOB, ALICE, U256::from(10u64));
        assert_eq!(result, Err(WrapError::InsufficientAllowance));

        // A failed attempt spends nothing
        assert_eq!(vault.allowance(ALICE, BOB), U256::from(9u64));
        assert_eq!(vault.balance_of(ALICE), U256::from(100u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_non_owner_withdraw_decrements_allowance_exactly() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();
        vault.approve(ALICE, BOB, U256::from(30u64));

        let returned = vault.withdraw_from(BOB, ALICE, U256::from(10u64)).unwrap();

        assert_eq!(returned, U256::from(10u64));
        // Allowance drops by exactly the withdrawn amount
        assert_eq!(vault.allowance(ALICE, BOB), U256::from(20u64));
        assert_eq!(vault.balance_of(ALICE), U256::from(90u64));
        vault.assert_solvent();

        // The remainder stays spendable
        vault.withdraw_from(BOB, ALICE, U256::from(20u64)).unwrap();
        assert_eq!(vault.allowance(ALICE, BOB), U256::zero());
        vault.assert_solvent();
    }

    #[test]
    fn test_transfer_from_decrements_allowance_exactly() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();

        // Rejected before any allowance exists
        let result = vault.transfer_from(BOB, ALICE, BOB, U256::from(25u64));
        assert_eq!(result, Err(WrapError::InsufficientAllowance));

        vault.approve(ALICE, BOB, U256::from(40u64));
        vault.transfer_from(BOB, ALICE, BOB, U256::from(25u64)).unwrap();

        assert_eq!(vault.allowance(ALICE, BOB), U256::from(15u64));
        assert_eq!(vault.balance_of(ALICE), U256::from(75u64));
        assert_eq!(vault.balance_of(BOB), U256::from(25u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_owner_withdraw_spends_no_allowance() {
        let mut vault = VaultModel::new();
        vault.deposit(ALICE, U256::from(100u64)).unwrap();
        vault.approve(ALICE, BOB, U256::from(30u64));

        vault.withdraw_from(ALICE, ALICE, U256::from(50u64)).unwrap();

        // The owner path leaves third-party allowances untouched
        assert_eq!(vault.allowance(ALICE, BOB), U256::from(30u64));
        vault.assert_solvent();
    }

    #[test]
    fn test_invariant_across_mixed_sequence() {
        let mut vault = VaultModel::new();
        let amounts = [7u64, 1000, 3, 999_999, 42];

        for (i, amount) in amounts.iter().enumerate() {
            vault.deposit(if i % 2 == 0 { ALICE } else { BOB }, U256::from(*amount)).unwrap();
            vault.assert_solvent();
        }
        vault.transfer(ALICE, BOB, U256::from(500u64)).unwrap();
        vault.assert_solvent();
        vault.withdraw(BOB, U256::from(1400u64)).unwrap();
        vault.assert_solvent();

        let total: u64 = amounts.iter().sum();
        assert_eq!(vault.total_supply, U256::from(total - 1400));
    }
}

#[cfg(test)]
mod oracle_tests {
    use odra::casper_types::U256;
    use pm_wrap_contracts::price_oracle::{apply_spread, is_fresh, quote_out};
    use pm_wrap_contracts::types::{MAX_SPREAD_BPS, PRICE_PRECISION, SPREAD_SIDE_DIVISOR};

    const E6: u128 = 1_000_000;
    const E18: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_end_to_end_quote_scenario() {
        // A market maker wraps 100e18 outcome units; the admin prices the
        // claim token at 0.6 quote units (0.6e6 raw, quote asset has 6
        // decimals) per 1e18 claim
        let shares = U256::from(100u64) * U256::from(E18);
        let price = U256::from(600_000u64);

        // mid = 100e18 * 0.6e6 / 1e18 = 60e6
        let mid = quote_out(shares, price);
        assert_eq!(mid, U256::from(60u64) * U256::from(E6));

        // With the default 200 bps spread, each side moves by 1%:
        // 60e6 * 200 / 20000 = 0.6e6
        let (bid, ask) = apply_spread(mid, 200);
        assert_eq!(bid, U256::from(59_400_000u64));
        assert_eq!(ask, U256::from(60_600_000u64));
    }

    #[test]
    fn test_spread_override_widens_quotes() {
        // A vault override of 1000 bps moves each side by 5%
        let mid = U256::from(100u64) * U256::from(E6);
        let (narrow_bid, narrow_ask) = apply_spread(mid, 200);
        let (wide_bid, wide_ask) = apply_spread(mid, 1000);

        assert_eq!(wide_bid, U256::from(95u64) * U256::from(E6));
        assert_eq!(wide_ask, U256::from(105u64) * U256::from(E6));
        assert!(wide_bid < narrow_bid);
        assert!(wide_ask > narrow_ask);
    }

    #[test]
    fn test_max_spread_still_positive() {
        // At the 5000 bps cap each side moves by 25%; the bid never
        // collapses to zero for a non-dust mid
        let mid = U256::from(100u64) * U256::from(E6);
        let (bid, ask) = apply_spread(mid, MAX_SPREAD_BPS);
        assert_eq!(bid, U256::from(75u64) * U256::from(E6));
        assert_eq!(ask, U256::from(125u64) * U256::from(E6));
    }

    #[test]
    fn test_quote_truncation_floors_dust() {
        // 1 raw claim unit at price 0.6e6 is worth less than one quote
        // unit and floors to zero
        assert!(quote_out(U256::from(1u64), U256::from(600_000u64)).is_zero());
    }

    #[test]
    fn test_staleness_boundary() {
        // Record stamped at t=1000 with max_staleness 3600: quotable
        // through t=4600 inclusive, stale from t=4601
        let updated_at = 1000u64;
        let max_staleness = 3600u64;

        assert!(is_fresh(updated_at, updated_at, max_staleness));
        assert!(is_fresh(updated_at + max_staleness, updated_at, max_staleness));
        assert!(!is_fresh(updated_at + max_staleness + 1, updated_at, max_staleness));
    }

    #[test]
    fn test_zero_staleness_means_same_block_only() {
        assert!(is_fresh(500, 500, 0));
        assert!(!is_fresh(501, 500, 0));
    }

    #[test]
    fn test_precision_constants() {
        assert_eq!(PRICE_PRECISION, E18);
        // The side divisor halves a full spread expressed in bps
        assert_eq!(SPREAD_SIDE_DIVISOR, 20_000);
        assert_eq!(MAX_SPREAD_BPS, 5_000);
    }

    #[test]
    fn test_unit_price_round_trips() {
        // price = 1e18 quotes 1:1 at any size
        let price = U256::from(PRICE_PRECISION);
        for amount in [0u64, 1, 999, 1_000_000_007] {
            assert_eq!(quote_out(U256::from(amount), price), U256::from(amount));
        }
    }
}

#[cfg(test)]
mod registry_tests {
    use odra::casper_types::U256;
    use pm_wrap_contracts::errors::WrapError;
    use std::collections::BTreeMap;

    /// Shadow model of the registry mapping plus its enumeration list
    struct RegistryModel {
        vaults: BTreeMap<U256, u8>,
        vault_list: Vec<u8>,
    }

    impl RegistryModel {
        fn new() -> Self {
            Self {
                vaults: BTreeMap::new(),
                vault_list: Vec::new(),
            }
        }

        fn register(&mut self, position_id: U256, vault: u8) -> Result<(), WrapError> {
            if self.vaults.contains_key(&position_id) {
                return Err(WrapError::VaultAlreadyExists);
            }
            self.vaults.insert(position_id, vault);
            self.vault_list.push(vault);
            Ok(())
        }
    }

    #[test]
    fn test_one_vault_per_position() {
        let mut registry = RegistryModel::new();
        registry.register(U256::from(7u64), 1).unwrap();

        let result = registry.register(U256::from(7u64), 2);
        assert_eq!(result, Err(WrapError::VaultAlreadyExists));
        // The first registration stands
        assert_eq!(registry.vaults.get(&U256::from(7u64)), Some(&1));
    }

    #[test]
    fn test_enumeration_preserves_registration_order() {
        let mut registry = RegistryModel::new();
        registry.register(U256::from(30u64), 3).unwrap();
        registry.register(U256::from(10u64), 1).unwrap();
        registry.register(U256::from(20u64), 2).unwrap();

        // Listed in registration order, not id order
        assert_eq!(registry.vault_list, vec![3, 1, 2]);
    }

    #[test]
    fn test_unknown_position_unresolved() {
        let registry = RegistryModel::new();
        assert!(registry.vaults.get(&U256::from(99u64)).is_none());
    }
}

// Rollback of a partially executed flow (e.g. a borrow leg failing after
// the deposit leg) is a deploy-level guarantee on Casper: any revert
// discards every effect of the deploy. These tests therefore cover the
// composition the router submits, not the rollback itself.
#[cfg(test)]
mod router_tests {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::U256;
    use odra::prelude::*;
    use pm_wrap_contracts::batch::{BatchOpKind, UnitOfWork};

    fn addr(byte: u8) -> Address {
        Address::Account(AccountHash::new([byte; 32]))
    }

    #[test]
    fn test_repay_batch_is_single_item() {
        let account = addr(1);
        let repay_vault = addr(3);
        let router = addr(9);

        let mut work = UnitOfWork::new();
        work.repay(account, repay_vault, U256::from(200u64), router);

        let items = work.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, BatchOpKind::Repay);
        assert_eq!(items[0].on_behalf_of, account);
        // The router fronts the repay asset it pulled from the account
        assert_eq!(items[0].counterparty, router);
    }

    #[test]
    fn test_max_sentinel_resolves_to_live_debt() {
        // U256::MAX never reaches the connector; it resolves to the live
        // debt before the repay leg runs
        let live_debt = U256::from(12_345u64);
        let requested = U256::MAX;

        let amount = if requested == U256::MAX { live_debt } else { requested };
        assert_eq!(amount, live_debt);

        let explicit = U256::from(100u64);
        let amount = if explicit == U256::MAX { live_debt } else { explicit };
        assert_eq!(amount, explicit);
    }

    // ===== Cross-Contract Call Logic Tests =====
    // Note: Full E2E tests require odra-test-vm specific setup.
    // The cross-contract call logic is verified at the unit test level
    // by testing the call definitions and the batch data structures.

    /// Verify cross-contract call arguments are correctly formed
    #[test]
    fn test_cross_contract_call_args() {
        use odra::casper_types::bytesrepr::Bytes;
        use odra::casper_types::RuntimeArgs;
        use odra::CallDef;

        // Custody pull from the position ledger
        let args = odra::casper_types::runtime_args! {
            "from" => addr(1),
            "to" => addr(9),
            "id" => U256::from(7u64),
            "amount" => U256::from(100u64),
            "data" => Bytes::from(Vec::new())
        };
        let call_def = CallDef::new("safe_transfer_from", true, args);
        assert_eq!(call_def.entry_point(), "safe_transfer_from");
        assert!(call_def.is_mut());

        // Vault deposit on behalf of the caller
        let args = odra::casper_types::runtime_args! {
            "amount" => U256::from(100u64),
            "receiver" => addr(1)
        };
        let call_def = CallDef::new("deposit", true, args);
        assert_eq!(call_def.entry_point(), "deposit");
        assert!(call_def.is_mut());

        // Post-withdraw solvency gate is a read on the connector
        let args = odra::casper_types::runtime_args! {
            "account" => addr(1)
        };
        let call_def = CallDef::new("require_account_status_check", false, args);
        assert_eq!(call_def.entry_point(), "require_account_status_check");
        assert!(!call_def.is_mut());

        // Repay asset lookup takes no arguments
        let call_def = CallDef::new("asset", false, RuntimeArgs::new());
        assert_eq!(call_def.entry_point(), "asset");
        assert!(!call_def.is_mut());
    }
}
