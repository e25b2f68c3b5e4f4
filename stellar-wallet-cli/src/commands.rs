//! Command implementations
//!
//! Every command returns its complete stdout text. Callers print it only
//! after the command succeeded, so a failure never leaves partial output.

use std::env::VarError;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use stellar_wallet::account::{self, Address, GeneratedWallet};
use stellar_wallet::crypto::mnemonic::MnemonicStrength;
use stellar_wallet::horizon::{decode_data_value, AccountRecord, HorizonClient, SubmitResult};
use stellar_wallet::stream::{CursorStore, PaymentWatcher};
use stellar_wallet::transaction::parse_amount;
use stellar_wallet::{Envelope, HorizonConfig, KeyPair, MultisigOptions};

/// Environment variable holding the account to inspect
pub const SENDER_PUBLIC_KEY: &str = "SENDER_PUBLIC_KEY";

/// Pick the explicit account if given, otherwise `SENDER_PUBLIC_KEY`
pub fn resolve_account(explicit: Option<String>) -> Result<String> {
    account_or_env(explicit, std::env::var(SENDER_PUBLIC_KEY))
}

fn account_or_env(explicit: Option<String>, var: std::result::Result<String, VarError>) -> Result<String> {
    match (explicit, var) {
        (Some(account), _) => Ok(account),
        (None, Ok(account)) => Ok(account),
        (None, Err(VarError::NotPresent)) => bail!("{} is not set", SENDER_PUBLIC_KEY),
        (None, Err(VarError::NotUnicode(_))) => {
            bail!("{} is set but is not valid Unicode", SENDER_PUBLIC_KEY)
        }
    }
}

/// Render the five account lines: balances, sequence, flags, signers, data
pub fn render_account(record: &AccountRecord) -> String {
    [
        render_balances(record),
        format!("Sequence Number: {}", record.sequence),
        format!("Flags: {}", record.flags),
        format!("Signers: [{}]", join(&record.signers)),
        format!("Data: {{{}}}", render_data(record)),
    ]
    .join("\n")
}

/// Render the balances line
pub fn render_balances(record: &AccountRecord) -> String {
    format!("Balances: [{}]", join(&record.balances))
}

fn render_data(record: &AccountRecord) -> String {
    record
        .data
        .iter()
        .map(|(key, value)| format!("{}: {}", key, decode_data_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

async fn load_account(config: HorizonConfig, account: &str) -> Result<AccountRecord> {
    let address = Address::new(account)
        .with_context(|| format!("Invalid public key '{}'", account))?;

    debug!(horizon = %config.horizon_url, account = address.as_str(), "Fetching account");
    let client = HorizonClient::new(config)?;

    address
        .get(&client)
        .await
        .with_context(|| format!("Failed to load account {}", address.as_str()))
}

/// Fetch an account and render all of its fields
pub async fn inspect(config: HorizonConfig, account: &str) -> Result<String> {
    let record = load_account(config, account).await?;
    Ok(render_account(&record))
}

/// Fetch an account and render only its balances
pub async fn balance(config: HorizonConfig, account: &str) -> Result<String> {
    let record = load_account(config, account).await?;
    Ok(render_balances(&record))
}

/// Create and fund an account through friendbot
pub async fn fund(config: HorizonConfig, account: &str) -> Result<String> {
    let client = HorizonClient::new(config)?;
    let result = client
        .fund_with_friendbot(account)
        .await
        .with_context(|| format!("Failed to fund account {}", account))?;

    Ok(match result.hash {
        Some(hash) => format!("Funded: {}\nTransaction: {}", result.account_id, hash),
        None => format!("Funded: {}", result.account_id),
    })
}

fn key_pair(secret: &str, name: &str) -> Result<KeyPair> {
    KeyPair::from_secret_seed(secret).with_context(|| format!("Invalid {} secret seed", name))
}

fn address(account: &str, name: &str) -> Result<Address> {
    Address::new(account).with_context(|| format!("Invalid {} public key '{}'", name, account))
}

/// Render a submission: the transaction hash and its ledger
pub fn render_submission(result: &SubmitResult) -> String {
    match result.ledger {
        Some(ledger) => format!("Transaction: {}\nLedger: {}", result.hash, ledger),
        None => format!("Transaction: {}", result.hash),
    }
}

/// Pay XLM from the sender, or print the signed envelope when `submit` is off
pub async fn pay(
    config: HorizonConfig,
    sender_secret: &str,
    destination: &str,
    amount: &str,
    submit: bool,
) -> Result<String> {
    let sender = key_pair(sender_secret, "sender")?;
    let destination = address(destination, "destination")?;
    let amount = parse_amount(amount)?;
    let client = HorizonClient::new(config)?;

    if !submit {
        let envelope = account::prepare_payment(&client, &sender, &destination, amount)
            .await
            .context("Failed to prepare payment")?;
        return Ok(envelope.to_base64()?);
    }

    let result = account::send_payment(&client, &sender, &destination, amount)
        .await
        .context("Failed to send payment")?;
    Ok(render_submission(&result))
}

/// Add the second signer to the sender account
pub async fn multisig_setup(
    config: HorizonConfig,
    sender_secret: &str,
    co_signer: &str,
    options: &MultisigOptions,
) -> Result<String> {
    let sender = key_pair(sender_secret, "sender")?;
    let co_signer = address(co_signer, "second signer")?;
    let client = HorizonClient::new(config)?;

    let result = account::configure_multisig(&client, &sender, &co_signer, options)
        .await
        .context("Failed to set multi-signature options")?;
    Ok(render_submission(&result))
}

/// Pay XLM from a two-signer account, signing with both keys
pub async fn multisig_pay(
    config: HorizonConfig,
    sender_secret: &str,
    co_signer_secret: &str,
    destination: &str,
    amount: &str,
) -> Result<String> {
    let sender = key_pair(sender_secret, "sender")?;
    let co_signer = key_pair(co_signer_secret, "second signer")?;
    let destination = address(destination, "destination")?;
    let amount = parse_amount(amount)?;
    let client = HorizonClient::new(config)?;

    let result = account::send_multisig_payment(&client, &sender, &co_signer, &destination, amount)
        .await
        .context("Failed to send multi-signature payment")?;
    Ok(render_submission(&result))
}

/// Read an envelope from the argument, or from stdin when absent
pub fn read_envelope(envelope: Option<String>) -> Result<String> {
    match envelope {
        Some(envelope) => Ok(envelope),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read envelope from stdin")?;
            Ok(input.trim().to_string())
        }
    }
}

/// Co-sign an envelope and submit it, or print it when `submit` is off
pub async fn cosign(
    config: HorizonConfig,
    co_signer_secret: &str,
    encoded: &str,
    submit: bool,
) -> Result<String> {
    let co_signer = key_pair(co_signer_secret, "second signer")?;
    let mut envelope = Envelope::from_base64(encoded).context("Failed to decode envelope")?;

    if !submit {
        envelope.sign(&co_signer, config.network)?;
        return Ok(envelope.to_base64()?);
    }

    let client = HorizonClient::new(config)?;
    let result = account::cosign(&client, &co_signer, envelope)
        .await
        .context("Failed to submit co-signed transaction")?;
    Ok(render_submission(&result))
}

/// List payments of an account, followed by the cursor to continue from
pub async fn payments(
    config: HorizonConfig,
    account: &str,
    cursor: Option<&str>,
    limit: u32,
) -> Result<String> {
    let account = address(account, "account")?;
    let client = HorizonClient::new(config)?;

    let records = client
        .payments(account.as_str(), cursor, limit)
        .await
        .with_context(|| format!("Failed to load payments of {}", account.as_str()))?;

    let Some(last) = records.last() else {
        return Ok("No payments".to_string());
    };

    let mut lines: Vec<String> = records.iter().map(ToString::to_string).collect();
    lines.push(format!("Cursor: {}", last.paging_token));
    Ok(lines.join("\n"))
}

/// Print payments received by `account` until interrupted
///
/// The last handled paging token is kept in `cursor_file`. Failed polls are
/// logged and retried on the next tick.
pub async fn watch(
    config: HorizonConfig,
    account: &str,
    cursor_file: &Path,
    interval: Duration,
) -> Result<()> {
    let account = address(account, "receiving")?;
    let store = CursorStore::open(cursor_file)?;
    info!(account = account.as_str(), file = %store.path().display(), "Watching payments");

    let mut watcher = PaymentWatcher::new(HorizonClient::new(config)?, account).with_store(store);
    debug!(cursor = ?watcher.cursor(), "Resuming payment stream");

    loop {
        match watcher.poll().await {
            Ok(received) => {
                for payment in received {
                    println!("{}", payment);
                }
            }
            Err(e) => warn!("Error in payment stream: {}", e),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Ok(())
}

/// Generate a mnemonic and print it with its derived keypair
pub fn generate(strength: MnemonicStrength, passphrase: Option<&str>, index: u32) -> Result<String> {
    let wallet = GeneratedWallet::generate(strength, passphrase, index)
        .context("Failed to generate wallet")?;
    Ok(render_wallet(&wallet))
}

/// Re-derive the keypair of an existing mnemonic
pub fn derive(mnemonic: &str, passphrase: Option<&str>, index: u32) -> Result<String> {
    let wallet = GeneratedWallet::from_mnemonic(mnemonic, passphrase, index)
        .context("Failed to derive keypair from mnemonic")?;
    Ok(render_key_pair(wallet.key_pair()))
}

/// Generate a keypair that is not tied to a mnemonic
pub fn random_keypair() -> String {
    render_key_pair(&KeyPair::random())
}

fn render_key_pair(key_pair: &KeyPair) -> String {
    format!("{}\n{}", key_pair.public_key(), key_pair.secret_seed())
}

fn render_wallet(wallet: &GeneratedWallet) -> String {
    format!("{}\n{}\n{}", wallet.mnemonic(), wallet.public_key(), wallet.secret_seed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_wallet::horizon::{Balance, Flags, Signer};
    use stellar_wallet::Network;

    const ACCOUNT_ID: &str = "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6";

    fn record() -> AccountRecord {
        AccountRecord {
            account_id: ACCOUNT_ID.to_string(),
            sequence: 12345,
            subentry_count: 0,
            home_domain: None,
            thresholds: Default::default(),
            flags: Flags { auth_required: true, ..Default::default() },
            balances: vec![Balance {
                balance: "100.0000000".to_string(),
                asset_type: "native".to_string(),
                asset_code: None,
                asset_issuer: None,
                limit: None,
                liquidity_pool_id: None,
            }],
            signers: vec![Signer {
                key: ACCOUNT_ID.to_string(),
                weight: 1,
                signer_type: "ed25519_public_key".to_string(),
            }],
            data: [("name".to_string(), "c3RlbGxhcg==".to_string())].into_iter().collect(),
        }
    }

    #[test]
    fn test_render_account() {
        let output = render_account(&record());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Balances: [100.0000000 XLM]");
        assert_eq!(lines[1], "Sequence Number: 12345");
        assert_eq!(
            lines[2],
            "Flags: auth_required=true, auth_revocable=false, auth_immutable=false, auth_clawback_enabled=false"
        );
        assert_eq!(lines[3], format!("Signers: [{} (weight 1, ed25519_public_key)]", ACCOUNT_ID));
        assert_eq!(lines[4], "Data: {name: stellar}");
    }

    #[test]
    fn test_render_empty_collections() {
        let mut record = record();
        record.balances.clear();
        record.signers.clear();
        record.data.clear();

        let output = render_account(&record);
        assert!(output.contains("Balances: []"));
        assert!(output.contains("Signers: []"));
        assert!(output.ends_with("Data: {}"));
    }

    #[test]
    fn test_resolve_explicit_account() {
        assert_eq!(resolve_account(Some(ACCOUNT_ID.to_string())).unwrap(), ACCOUNT_ID);
    }

    #[test]
    fn test_missing_sender_public_key() {
        let error = account_or_env(None, Err(VarError::NotPresent)).unwrap_err();
        assert_eq!(error.to_string(), "SENDER_PUBLIC_KEY is not set");
    }

    #[test]
    fn test_non_unicode_sender_public_key() {
        let error = account_or_env(None, Err(VarError::NotUnicode("\u{fffd}".into()))).unwrap_err();
        assert_eq!(error.to_string(), "SENDER_PUBLIC_KEY is set but is not valid Unicode");

        let account = account_or_env(None, Ok(ACCOUNT_ID.to_string())).unwrap();
        assert_eq!(account, ACCOUNT_ID);
    }

    #[test]
    fn test_render_submission() {
        let result = SubmitResult {
            hash: "abc".to_string(),
            ledger: Some(9),
            successful: true,
            envelope_xdr: None,
            result_xdr: None,
        };
        assert_eq!(render_submission(&result), "Transaction: abc\nLedger: 9");
    }

    #[tokio::test]
    async fn test_pay_rejects_bad_input_before_requests() {
        let config = HorizonConfig::for_network(Network::Testnet);
        let secret = KeyPair::random().secret_seed();

        let error = pay(config.clone(), "SNOTASECRET", ACCOUNT_ID, "1", true).await.unwrap_err();
        assert!(error.to_string().contains("sender secret seed"));

        let error = pay(config.clone(), &secret, "GBAD", "1", true).await.unwrap_err();
        assert!(error.to_string().contains("destination public key"));

        let error = pay(config, &secret, ACCOUNT_ID, "1.00000001", true).await.unwrap_err();
        assert!(format!("{:#}", error).contains("decimal places"));
    }

    #[tokio::test]
    async fn test_cosign_offline() {
        let sender = KeyPair::from_seed_bytes(&[3u8; 32]);
        let co_signer = KeyPair::from_seed_bytes(&[4u8; 32]);
        let source: AccountRecord = serde_json::from_value(serde_json::json!({
            "account_id": sender.public_key(),
            "sequence": "10",
        }))
        .unwrap();
        let destination = Address::new(ACCOUNT_ID).unwrap();

        let mut envelope = stellar_wallet::transaction::TransactionBuilder::new(&source)
            .unwrap()
            .payment(&destination, 5)
            .unwrap()
            .build()
            .unwrap();
        envelope.sign(&sender, Network::Testnet).unwrap();

        let config = HorizonConfig::for_network(Network::Testnet);
        let output = cosign(config, &co_signer.secret_seed(), &envelope.to_base64().unwrap(), false)
            .await
            .unwrap();

        let signed = Envelope::from_base64(&output).unwrap();
        assert_eq!(signed.signature_count(), 2);
        assert!(signed.is_signed_by(&co_signer.public_key_bytes(), Network::Testnet).unwrap());
    }

    #[test]
    fn test_generate_output() {
        let output = generate(MnemonicStrength::Words12, None, 0).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split(' ').count(), 12);
        assert!(lines[1].starts_with('G'));
        assert!(lines[2].starts_with('S'));
        assert_eq!(derive(lines[0], None, 0).unwrap(), format!("{}\n{}", lines[1], lines[2]));
    }

    #[test]
    fn test_generate_twice_differs() {
        let first = generate(MnemonicStrength::Words24, None, 0).unwrap();
        let second = generate(MnemonicStrength::Words24, None, 0).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.lines().next().unwrap().split(' ').count(), 24);
    }

    #[test]
    fn test_random_keypair() {
        let output = random_keypair();
        let lines: Vec<&str> = output.lines().collect();
        let restored = KeyPair::from_secret_seed(lines[1]).unwrap();
        assert_eq!(restored.public_key(), lines[0]);
    }

    #[tokio::test]
    async fn test_inspect_rejects_malformed_key() {
        let config = HorizonConfig::for_network(Network::Testnet);
        let error = inspect(config, "not-a-key").await.unwrap_err();
        assert!(error.to_string().contains("Invalid public key"));
    }
}
