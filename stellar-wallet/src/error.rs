//! Error types for the stellar-wallet library

use thiserror::Error;

/// Custom error type for stellar-wallet operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Horizon error ({status}): {title}: {detail}")]
    Horizon {
        status: u16,
        title: String,
        detail: String,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Result type for stellar-wallet operations
pub type Result<T> = std::result::Result<T, Error>;
