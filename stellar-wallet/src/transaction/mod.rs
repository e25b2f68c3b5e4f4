//! Transaction functionality
//!
//! Building, signing and encoding the transactions the wallet submits:
//! native payments and the set-options changes that turn an account into
//! a two-signer account.

pub mod amount;
mod builder;
mod envelope;

pub use amount::{format_amount, parse_amount};
pub use builder::*;
pub use envelope::Envelope;
