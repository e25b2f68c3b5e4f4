//! Generate a mnemonic and print it with the derived public key and seed

use anyhow::Result;

use stellar_wallet::crypto::mnemonic::MnemonicStrength;
use stellar_wallet_cli::commands;
use stellar_wallet_cli::observability::init_tracing;

fn main() -> Result<()> {
    init_tracing("warn");

    let output = commands::generate(MnemonicStrength::default(), None, 0)?;
    println!("{}", output);

    Ok(())
}
