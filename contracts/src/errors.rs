//! Protocol error definitions.

use odra::prelude::*;

/// Wrapped-position protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WrapError {
    // Registry errors (1xx)
    VaultAlreadyExists = 100,
    VaultNotFound = 101,
    VaultMismatch = 102,

    // Vault errors (2xx)
    InvalidPositionId = 200,
    InsufficientTokenBalance = 201,
    InsufficientAllowance = 202,

    // Oracle errors (3xx)
    PriceNotSet = 300,
    StalePrice = 301,
    InvalidPrice = 302,
    InvalidSpread = 303,
    ArrayLengthMismatch = 304,

    // Router errors (4xx)
    InvalidAmount = 400,

    // Access control errors (5xx)
    Unauthorized = 500,

    // Configuration errors (9xx)
    InvalidAddress = 900,
    InvalidConfig = 901,
}

impl WrapError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Registry
            WrapError::VaultAlreadyExists => "Vault already registered for this position id",
            WrapError::VaultNotFound => "No vault registered for this position id",
            WrapError::VaultMismatch => "Vault binding does not match registration",

            // Vault
            WrapError::InvalidPositionId => "Position id does not match the vault binding",
            WrapError::InsufficientTokenBalance => "Insufficient claim token balance",
            WrapError::InsufficientAllowance => "Insufficient claim token allowance",

            // Oracle
            WrapError::PriceNotSet => "Price not set or invalidated",
            WrapError::StalePrice => "Price exceeds maximum staleness",
            WrapError::InvalidPrice => "Price must be non-zero",
            WrapError::InvalidSpread => "Spread exceeds maximum bps",
            WrapError::ArrayLengthMismatch => "Array lengths differ",

            // Router
            WrapError::InvalidAmount => "Amount must be non-zero",

            // Access control
            WrapError::Unauthorized => "Unauthorized: caller is not admin",

            // Config
            WrapError::InvalidAddress => "Invalid address supplied at construction",
            WrapError::InvalidConfig => "Invalid configuration parameter",
        }
    }
}

impl core::fmt::Display for WrapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<WrapError> for OdraError {
    fn from(error: WrapError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
