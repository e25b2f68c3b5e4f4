//! Stellar Wallet CLI
//!
//! Shared pieces of the `stellar-wallet`, `stellar-check` and
//! `stellar-generate` binaries, and the co-signing HTTP service.

pub mod args;
pub mod commands;
pub mod observability;
pub mod server;
