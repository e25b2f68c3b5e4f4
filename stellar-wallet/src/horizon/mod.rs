//! Horizon API access
//!
//! A thin client over the Horizon REST endpoints the wallet tools need:
//! account lookup, payment history, transaction submission and testnet
//! friendbot funding.

pub mod types;
mod client;

pub use types::*;
pub use client::{HorizonClient, MAX_PAGE_SIZE};
