//! Payments and multi-signature account setup

use tracing::{debug, info};

use crate::crypto::keys::KeyPair;
use crate::error::Result;
use crate::horizon::{HorizonClient, SubmitResult};
use crate::transaction::{format_amount, Envelope, MultisigOptions, TransactionBuilder};
use super::address::Address;

/// Build an XLM payment from `source` to `destination`, signed by `source`
///
/// Fails with `AccountNotFound` when the destination does not exist, before
/// anything is signed.
pub async fn prepare_payment(
    client: &HorizonClient,
    source: &KeyPair,
    destination: &Address,
    amount: i64,
) -> Result<Envelope> {
    destination.get(client).await?;
    let account = client.account(&source.public_key()).await?;

    let mut envelope = TransactionBuilder::new(&account)?
        .payment(destination, amount)?
        .build()?;
    envelope.sign(source, client.config().network)?;

    debug!(
        source = %account.account_id,
        destination = destination.as_str(),
        amount = %format_amount(amount),
        sequence = envelope.sequence(),
        hash = %envelope.hash_hex(client.config().network)?,
        "Prepared payment"
    );
    Ok(envelope)
}

/// Send an XLM payment signed by the source key alone
pub async fn send_payment(
    client: &HorizonClient,
    source: &KeyPair,
    destination: &Address,
    amount: i64,
) -> Result<SubmitResult> {
    let envelope = prepare_payment(client, source, destination, amount).await?;
    client.submit_transaction(&envelope).await
}

/// Send an XLM payment from a two-signer account, signed by both keys
pub async fn send_multisig_payment(
    client: &HorizonClient,
    source: &KeyPair,
    co_signer: &KeyPair,
    destination: &Address,
    amount: i64,
) -> Result<SubmitResult> {
    let mut envelope = prepare_payment(client, source, destination, amount).await?;
    envelope.sign(co_signer, client.config().network)?;
    client.submit_transaction(&envelope).await
}

/// Add `co_signer` to the source account and raise its thresholds
///
/// Only the source key signs: the new signer takes effect once this
/// transaction is applied.
pub async fn configure_multisig(
    client: &HorizonClient,
    source: &KeyPair,
    co_signer: &Address,
    options: &MultisigOptions,
) -> Result<SubmitResult> {
    let account = client.account(&source.public_key()).await?;

    let mut envelope = TransactionBuilder::new(&account)?
        .multisig(co_signer, options)?
        .build()?;
    envelope.sign(source, client.config().network)?;

    info!(
        account = %account.account_id,
        co_signer = co_signer.as_str(),
        "Submitting multi-signature options"
    );
    client.submit_transaction(&envelope).await
}

/// Add the co-signer's signature to a partially signed envelope and submit it
pub async fn cosign(
    client: &HorizonClient,
    co_signer: &KeyPair,
    mut envelope: Envelope,
) -> Result<SubmitResult> {
    envelope.sign(co_signer, client.config().network)?;
    debug!(
        source = %envelope.source_account(),
        signatures = envelope.signature_count(),
        "Co-signed transaction"
    );
    client.submit_transaction(&envelope).await
}
