//! Stellar Wallet Core
//!
//! This library provides the pieces behind the Stellar wallet tools:
//! BIP-39 mnemonic generation, SEP-0005 keypair derivation, network
//! configuration, account lookups against a Horizon server, payments from
//! single and two-signer accounts, and payment streaming.

pub mod error;
pub mod config;
pub mod crypto;
pub mod horizon;
pub mod transaction;
pub mod account;
pub mod stream;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use config::{HorizonConfig, Network};
pub use account::{Address, GeneratedWallet};
pub use crypto::keys::KeyPair;
pub use transaction::{Envelope, MultisigOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_crypto() {
        let result = crate::crypto::mnemonic::generate_mnemonic(
            crate::crypto::mnemonic::MnemonicStrength::Words12
        ).unwrap();
        assert!(!result.is_empty());
    }
}
