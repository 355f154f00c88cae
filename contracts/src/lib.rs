//! Position Wrapping Contracts
//!
//! Casper-native system that turns non-fungible prediction-market outcome
//! positions into fungible, lending-compatible collateral claims.
//!
//! ## Architecture
//!
//! - **VaultRegistry**: One wrap vault per position id, enumerable
//! - **PositionVault**: Custodies outcome units 1:1 against a CEP-18 claim token
//! - **PriceOracle**: Admin-fed per-vault prices with staleness and spread gating
//! - **Router**: Chains wrap+borrow and repay+unwrap through the lending connector
//!
//! ## Invariant
//!
//! Each vault's custodied units always equal its claim token supply; claim
//! tokens are redeemable at par for as long as an account passes the
//! connector's solvency check after unwrapping.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod interfaces;
pub mod batch;
pub mod events;

// Contract modules
pub mod registry;
pub mod position_vault;
pub mod price_oracle;
pub mod router;
