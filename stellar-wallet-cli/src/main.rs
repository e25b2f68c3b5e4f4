//! Stellar Wallet CLI
//!
//! Account inspection, wallet generation, testnet funding, payments,
//! multi-signature co-signing and payment streaming behind one command.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use stellar_wallet_cli::args::{strength, Cli, Commands};
use stellar_wallet_cli::{commands, server};
use stellar_wallet::horizon::HorizonClient;
use stellar_wallet::KeyPair;
use stellar_wallet_cli::observability::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(if cli.verbose { "debug" } else { "warn" });
    tracing::debug!("Starting stellar-wallet {}", stellar_wallet::VERSION);

    let output = match cli.command {
        Commands::Inspect { account } => {
            let account = commands::resolve_account(account)?;
            commands::inspect(cli.network.config()?, &account).await?
        }
        Commands::Balance { account } => {
            let account = commands::resolve_account(account)?;
            commands::balance(cli.network.config()?, &account).await?
        }
        Commands::Generate { words, passphrase, index } => {
            commands::generate(strength(words)?, passphrase.as_deref(), index)?
        }
        Commands::Derive { mnemonic, passphrase, index } => {
            commands::derive(&mnemonic, passphrase.as_deref(), index)?
        }
        Commands::Random => commands::random_keypair(),
        Commands::Fund { account } => {
            let account = commands::resolve_account(account)?;
            commands::fund(cli.network.config()?, &account).await?
        }
        Commands::Pay { sender, to, amount, no_submit } => {
            commands::pay(cli.network.config()?, &sender.secret, &to, &amount, !no_submit).await?
        }
        Commands::MultisigSetup { sender, co_signer, weights } => {
            commands::multisig_setup(cli.network.config()?, &sender.secret, &co_signer, &weights.options())
                .await?
        }
        Commands::MultisigPay { sender, co_signer, to, amount } => {
            commands::multisig_pay(cli.network.config()?, &sender.secret, &co_signer.secret, &to, &amount)
                .await?
        }
        Commands::Cosign { co_signer, envelope, no_submit } => {
            let envelope = commands::read_envelope(envelope)?;
            commands::cosign(cli.network.config()?, &co_signer.secret, &envelope, !no_submit).await?
        }
        Commands::CosignServer { co_signer, listen } => {
            let key_pair = KeyPair::from_secret_seed(&co_signer.secret)
                .context("Invalid second signer secret seed")?;
            let client = HorizonClient::new(cli.network.config()?)?;
            return server::serve(listen, client, key_pair).await;
        }
        Commands::Payments { account, cursor, limit } => {
            let account = commands::resolve_account(account)?;
            commands::payments(cli.network.config()?, &account, cursor.as_deref(), limit).await?
        }
        Commands::Watch { account, cursor_file, interval } => {
            return commands::watch(cli.network.config()?, &account, &cursor_file, Duration::from_secs(interval))
                .await;
        }
    };

    println!("{}", output);

    Ok(())
}
