//! Cryptographic primitives and operations
//!
//! This module provides mnemonic generation and the SEP-0005 key
//! derivation used to turn a mnemonic into a Stellar keypair.

pub mod mnemonic;
pub mod keys;

pub use mnemonic::*;
pub use keys::*;
