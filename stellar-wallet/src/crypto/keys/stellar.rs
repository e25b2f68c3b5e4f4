//! Stellar key derivation (SEP-0005)

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::OsRng, RngCore};
use stellar_strkey::ed25519;

use crate::crypto::mnemonic::mnemonic_to_seed;
use crate::error::{Error, Result};
use super::derivation::derive_ed25519_key;

/// SLIP-44 coin type registered for Stellar
pub const STELLAR_COIN_TYPE: u32 = 148;

/// SEP-0005 derivation path for an account index
pub fn account_path(index: u32) -> String {
    format!("m/44'/{}'/{}'", STELLAR_COIN_TYPE, index)
}

/// An ed25519 keypair encoded the Stellar way
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Build a keypair from 32 raw secret key bytes
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    /// Derive the keypair for `index` from a mnemonic phrase
    ///
    /// The same phrase, passphrase and index always yield the same keypair.
    pub fn from_mnemonic(phrase: &str, passphrase: Option<&str>, index: u32) -> Result<Self> {
        let seed = mnemonic_to_seed(phrase, passphrase)?;
        let secret = derive_ed25519_key(&seed, &account_path(index))?;
        Ok(Self::from_seed_bytes(&secret))
    }

    /// Generate a keypair from OS randomness, unrelated to any mnemonic
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::from_seed_bytes(&secret)
    }

    /// Parse an `S...` secret seed
    pub fn from_secret_seed(seed: &str) -> Result<Self> {
        let private = ed25519::PrivateKey::from_string(seed.trim())
            .map_err(|e| Error::KeyDerivation(format!("Invalid secret seed: {}", e)))?;
        Ok(Self::from_seed_bytes(&private.0))
    }

    /// The `G...` account id
    pub fn public_key(&self) -> String {
        let verifying_key: VerifyingKey = self.signing_key.verifying_key();
        ed25519::PublicKey(verifying_key.to_bytes()).to_string()
    }

    /// The `S...` secret seed
    pub fn secret_seed(&self) -> String {
        ed25519::PrivateKey(self.signing_key.to_bytes()).to_string()
    }

    /// Raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Last four bytes of the public key, attached to signatures
    pub fn signature_hint(&self) -> [u8; 4] {
        let public = self.public_key_bytes();
        [public[28], public[29], public[30], public[31]]
    }

    /// Sign a message, normally a transaction hash
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.to_bytes() == other.signing_key.to_bytes()
    }
}

impl Eq for KeyPair {}

/// Decode a `G...` account id into raw public key bytes
pub fn decode_public_key(account_id: &str) -> Result<[u8; 32]> {
    let public = ed25519::PublicKey::from_string(account_id.trim())
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", account_id, e)))?;
    Ok(public.0)
}

/// Check an ed25519 signature made by `public_key` over `message`
pub fn verify_signature(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}
