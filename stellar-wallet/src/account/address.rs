//! Account address handle

use crate::crypto::keys::stellar::decode_public_key;
use crate::error::Result;
use crate::horizon::{AccountRecord, HorizonClient};

/// A Stellar account address
///
/// Construction validates the strkey, so a lookup is never attempted with
/// a malformed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// The `G...` account id
    address: String,
    /// Raw ed25519 public key
    public_key: [u8; 32],
}

impl Address {
    /// Create a new address from a `G...` account id
    pub fn new(address: &str) -> Result<Self> {
        let address = address.trim();
        let public_key = decode_public_key(address)?;

        Ok(Self {
            address: address.to_string(),
            public_key,
        })
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Get the raw public key bytes
    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Load the account's current on-chain state
    pub async fn get(&self, client: &HorizonClient) -> Result<AccountRecord> {
        client.account(&self.address).await
    }
}
