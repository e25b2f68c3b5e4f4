//! Key derivation and management
//!
//! `derivation` holds the chain-agnostic SLIP-10 ed25519 walk, `stellar`
//! turns the result into strkey-encoded Stellar keys.

pub mod stellar;
mod derivation;

pub use derivation::*;
pub use stellar::KeyPair;
