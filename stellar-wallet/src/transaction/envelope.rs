//! Signed transaction envelopes

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use stellar_strkey::ed25519;
use stellar_xdr::curr::{
    BytesM, DecoratedSignature, Hash, Limits, MuxedAccount, ReadXdr, Signature, SignatureHint,
    Transaction, TransactionEnvelope, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, VecM, WriteXdr,
};

use crate::config::Network;
use crate::crypto::keys::stellar::verify_signature;
use crate::crypto::keys::KeyPair;
use crate::error::{Error, Result};

fn xdr_error(context: &str, e: stellar_xdr::curr::Error) -> Error {
    Error::Transaction(format!("{}: {}", context, e))
}

/// A v1 transaction envelope and the signatures collected so far
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    inner: TransactionV1Envelope,
}

impl Envelope {
    /// Wrap a transaction that carries no signatures yet
    pub fn unsigned(tx: Transaction) -> Self {
        Self {
            inner: TransactionV1Envelope {
                tx,
                signatures: VecM::default(),
            },
        }
    }

    /// Decode a base64 `TransactionEnvelope` as submitted to Horizon
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Transaction(format!("Envelope is not valid base64: {}", e)))?;

        match TransactionEnvelope::from_xdr(bytes, Limits::none())
            .map_err(|e| xdr_error("Invalid transaction envelope", e))?
        {
            TransactionEnvelope::Tx(inner) => Ok(Self { inner }),
            TransactionEnvelope::TxV0(_) => Err(Error::NotSupported(
                "Legacy v0 transaction envelopes".to_string(),
            )),
            TransactionEnvelope::TxFeeBump(_) => Err(Error::NotSupported(
                "Fee bump transaction envelopes".to_string(),
            )),
        }
    }

    /// Encode as base64 XDR
    pub fn to_base64(&self) -> Result<String> {
        let bytes = TransactionEnvelope::Tx(self.inner.clone())
            .to_xdr(Limits::none())
            .map_err(|e| xdr_error("Failed to encode envelope", e))?;
        Ok(STANDARD.encode(bytes))
    }

    /// Transaction hash on `network`, the message every signer signs
    pub fn hash(&self, network: Network) -> Result<[u8; 32]> {
        let payload = TransactionSignaturePayload {
            network_id: Hash(network.network_id()),
            tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(
                self.inner.tx.clone(),
            ),
        };
        let bytes = payload
            .to_xdr(Limits::none())
            .map_err(|e| xdr_error("Failed to encode signature payload", e))?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// Hex transaction hash, as Horizon reports it
    pub fn hash_hex(&self, network: Network) -> Result<String> {
        Ok(self.hash(network)?.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Add a signature by `key_pair`
    ///
    /// Signing twice with the same key is a no-op.
    pub fn sign(&mut self, key_pair: &KeyPair, network: Network) -> Result<()> {
        if self.is_signed_by(&key_pair.public_key_bytes(), network)? {
            return Ok(());
        }

        let hash = self.hash(network)?;
        let signature: BytesM<64> = key_pair
            .sign(&hash)
            .to_vec()
            .try_into()
            .map_err(|e| xdr_error("Invalid signature", e))?;

        let mut signatures = self.inner.signatures.to_vec();
        signatures.push(DecoratedSignature {
            hint: SignatureHint(key_pair.signature_hint()),
            signature: Signature(signature),
        });
        self.inner.signatures = signatures
            .try_into()
            .map_err(|e| xdr_error("Too many signatures", e))?;

        Ok(())
    }

    /// Whether a valid signature by `public_key` is attached
    pub fn is_signed_by(&self, public_key: &[u8; 32], network: Network) -> Result<bool> {
        let hint = &public_key[28..];
        let hash = self.hash(network)?;

        Ok(self.inner.signatures.iter().any(|decorated| {
            decorated.hint.0[..] == *hint
                && verify_signature(public_key, &hash, decorated.signature.0.as_slice())
        }))
    }

    /// Source account of the transaction (`G...`)
    pub fn source_account(&self) -> String {
        let key = match &self.inner.tx.source_account {
            MuxedAccount::Ed25519(key) => key,
            MuxedAccount::MuxedEd25519(muxed) => &muxed.ed25519,
        };
        ed25519::PublicKey(key.0).to_string()
    }

    /// Sequence number the transaction consumes
    pub fn sequence(&self) -> i64 {
        self.inner.tx.seq_num.0
    }

    /// Total fee in stroops
    pub fn fee(&self) -> u32 {
        self.inner.tx.fee
    }

    /// Number of operations
    pub fn operation_count(&self) -> usize {
        self.inner.tx.operations.len()
    }

    /// Number of attached signatures
    pub fn signature_count(&self) -> usize {
        self.inner.signatures.len()
    }

    /// The underlying XDR transaction
    pub fn transaction(&self) -> &Transaction {
        &self.inner.tx
    }
}
