//! SLIP-10 ed25519 key derivation
//!
//! ed25519 only supports hardened children, so every path component must
//! carry the `'` marker.

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Offset added to an index to mark it hardened
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A 32-byte secret key together with its chain code
#[derive(Clone)]
pub struct ExtendedKey {
    /// Raw ed25519 secret key bytes
    pub secret_key: [u8; 32],
    /// Chain code for deriving children
    pub chain_code: [u8; 32],
}

/// Derive the ed25519 secret key at `path` from a BIP-39 seed
pub fn derive_ed25519_key(seed: &[u8], path: &str) -> Result<[u8; 32]> {
    let path_components = parse_derivation_path(path)?;

    let mut key = derive_master_key(seed)?;
    for component in path_components {
        key = derive_child_key(&key, component)?;
    }

    Ok(key.secret_key)
}

/// Parse a hardened-only derivation path such as `m/44'/148'/0'`
pub fn parse_derivation_path(path: &str) -> Result<Vec<u32>> {
    if path != "m" && !path.starts_with("m/") {
        return Err(Error::KeyDerivation(format!("Invalid derivation path: {}", path)));
    }

    let mut result = Vec::new();
    for component in path.trim_start_matches('m').split('/') {
        if component.is_empty() {
            continue;
        }

        let index = component
            .strip_suffix('\'')
            .ok_or_else(|| {
                Error::KeyDerivation(format!(
                    "ed25519 derivation requires hardened components: {}",
                    component
                ))
            })?
            .parse::<u32>()
            .map_err(|_| Error::KeyDerivation(format!("Invalid derivation path component: {}", component)))?;

        if index >= HARDENED_OFFSET {
            return Err(Error::KeyDerivation(format!("Derivation index out of range: {}", index)));
        }

        result.push(HARDENED_OFFSET + index);
    }

    Ok(result)
}

/// Derive the master key from a seed
fn derive_master_key(seed: &[u8]) -> Result<ExtendedKey> {
    let mut hmac = <HmacSha512 as Mac>::new_from_slice(b"ed25519 seed")
        .map_err(|_| Error::KeyDerivation("HMAC error".to_string()))?;

    hmac.update(seed);
    Ok(split_output(&hmac.finalize().into_bytes()))
}

/// Derive a hardened child key from a parent key
fn derive_child_key(parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
    let mut data = Vec::with_capacity(37);
    data.push(0);
    data.extend_from_slice(&parent.secret_key);
    data.extend_from_slice(&index.to_be_bytes());

    let mut hmac = <HmacSha512 as Mac>::new_from_slice(&parent.chain_code)
        .map_err(|_| Error::KeyDerivation("HMAC error".to_string()))?;

    hmac.update(&data);
    Ok(split_output(&hmac.finalize().into_bytes()))
}

fn split_output(output: &[u8]) -> ExtendedKey {
    let mut secret_key = [0u8; 32];
    let mut chain_code = [0u8; 32];

    secret_key.copy_from_slice(&output[0..32]);
    chain_code.copy_from_slice(&output[32..64]);

    ExtendedKey { secret_key, chain_code }
}
