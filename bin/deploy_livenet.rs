//! Deploy contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!   PM_WRAP_POSITION_LEDGER=hash-...   (outcome position ledger contract)
//!   PM_WRAP_CONNECTOR=hash-...         (lending market batch connector)
//!   PM_WRAP_POSITION_IDS=123,456       (position ids to wrap, comma separated)

use std::str::FromStr;

use odra::casper_types::U256;
use odra::host::Deployer;
use odra::prelude::*;

use pm_wrap_contracts::position_vault::{PositionVault, PositionVaultInitArgs};
use pm_wrap_contracts::price_oracle::{PriceOracle, PriceOracleInitArgs};
use pm_wrap_contracts::registry::{VaultRegistry, VaultRegistryInitArgs};
use pm_wrap_contracts::router::{Router, RouterInitArgs};

fn required_address(var: &str) -> Address {
    let raw = match std::env::var(var) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Missing environment variable {var}");
            std::process::exit(1);
        }
    };
    match Address::from_str(&raw) {
        Ok(addr) => addr,
        Err(_) => {
            eprintln!("Invalid contract hash in {var}: {raw}");
            std::process::exit(1);
        }
    }
}

fn position_ids() -> Vec<U256> {
    let raw = std::env::var("PM_WRAP_POSITION_IDS").unwrap_or_default();
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| match U256::from_dec_str(part.trim()) {
            Ok(id) => id,
            Err(_) => {
                eprintln!("Invalid position id in PM_WRAP_POSITION_IDS: {part}");
                std::process::exit(1);
            }
        })
        .collect()
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== PM-Wrap Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // External protocol references
    let position_ledger = required_address("PM_WRAP_POSITION_LEDGER");
    let connector = required_address("PM_WRAP_CONNECTOR");
    let ids = position_ids();
    println!("Position ledger: {:?}", position_ledger);
    println!("Connector:       {:?}", connector);
    println!();

    // ==================== Phase 1: Registry ====================
    println!("=== Phase 1: Deploying VaultRegistry ===");
    println!();

    let mut registry = VaultRegistry::deploy(
        &env,
        VaultRegistryInitArgs {
            custody_asset: position_ledger.into(),
            connector: connector.into(),
        },
    );
    let registry_addr = registry.address().clone();
    println!("VaultRegistry deployed at: {:?}", registry_addr);
    println!();

    // ==================== Phase 2: Wrap Vaults ====================
    println!("=== Phase 2: Deploying PositionVaults ===");
    println!();

    let mut vault_addrs = Vec::new();
    for id in &ids {
        println!("Deploying PositionVault for position {id}...");
        let vault = PositionVault::deploy(
            &env,
            PositionVaultInitArgs {
                position_id: *id,
                name: format!("Wrapped Position {id}"),
                symbol: format!("wPOS-{id}"),
                custody_asset: position_ledger.into(),
                connector: connector.into(),
            },
        );
        let vault_addr = vault.address().clone();
        println!("PositionVault deployed at: {:?}", vault_addr);

        println!("Registering vault...");
        registry.register_vault(*id, vault_addr);
        println!("Done.");

        vault_addrs.push((*id, vault_addr));
    }
    println!();

    // ==================== Phase 3: Oracle ====================
    println!("=== Phase 3: Deploying PriceOracle ===");
    println!();

    let oracle = PriceOracle::deploy(
        &env,
        PriceOracleInitArgs {
            admin: deployer.into(),
        },
    );
    let oracle_addr = oracle.address().clone();
    println!("PriceOracle deployed at: {:?}", oracle_addr);
    println!();

    // ==================== Phase 4: Router ====================
    println!("=== Phase 4: Deploying Router ===");
    println!();

    let router = Router::deploy(
        &env,
        RouterInitArgs {
            registry: registry_addr.into(),
            custody_asset: position_ledger.into(),
            connector: connector.into(),
        },
    );
    let router_addr = router.address().clone();
    println!("Router deployed at: {:?}", router_addr);

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  VaultRegistry: {:?}", registry_addr);
    for (id, addr) in &vault_addrs {
        println!("  PositionVault[{id}]: {:?}", addr);
    }
    println!("  PriceOracle:   {:?}", oracle_addr);
    println!("  Router:        {:?}", router_addr);
}
