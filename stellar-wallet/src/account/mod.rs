//! Account management functionality
//!
//! `Address` wraps an account id and loads its state from Horizon;
//! `GeneratedWallet` pairs a mnemonic with the keypair derived from it.
//! The transfer functions send payments and set up two-signer accounts.

mod address;
mod transfer;
mod wallet;

pub use address::*;
pub use transfer::*;
pub use wallet::*;
