//! Wallet generation

use tracing::info;

use crate::crypto::keys::KeyPair;
use crate::crypto::mnemonic::{generate_mnemonic, validate_mnemonic, MnemonicStrength};
use crate::error::Result;

/// A mnemonic together with the keypair derived from it
#[derive(Debug, Clone)]
pub struct GeneratedWallet {
    /// The mnemonic phrase
    mnemonic: String,
    /// The derived keypair
    key_pair: KeyPair,
}

impl GeneratedWallet {
    /// Create a new wallet with a freshly generated mnemonic
    pub fn generate(strength: MnemonicStrength, passphrase: Option<&str>, index: u32) -> Result<Self> {
        let mnemonic = generate_mnemonic(strength)?;
        Self::from_mnemonic(&mnemonic, passphrase, index)
    }

    /// Recreate a wallet from an existing mnemonic
    pub fn from_mnemonic(mnemonic: &str, passphrase: Option<&str>, index: u32) -> Result<Self> {
        validate_mnemonic(mnemonic)?;

        let key_pair = KeyPair::from_mnemonic(mnemonic, passphrase, index)?;
        info!(public_key = %key_pair.public_key(), index, "Derived keypair");

        Ok(Self {
            mnemonic: mnemonic.split_whitespace().collect::<Vec<_>>().join(" "),
            key_pair,
        })
    }

    /// Get the mnemonic phrase
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Get the keypair
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// The `G...` public key
    pub fn public_key(&self) -> String {
        self.key_pair.public_key()
    }

    /// The `S...` secret seed
    pub fn secret_seed(&self) -> String {
        self.key_pair.secret_seed()
    }
}
