//! Print the on-chain state of the account in `SENDER_PUBLIC_KEY`

use anyhow::Result;

use stellar_wallet::HorizonConfig;
use stellar_wallet_cli::commands;
use stellar_wallet_cli::observability::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing("warn");

    let account = commands::resolve_account(None)?;
    let output = commands::inspect(HorizonConfig::from_env()?, &account).await?;

    println!("{}", output);

    Ok(())
}
