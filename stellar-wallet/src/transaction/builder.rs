//! Transaction construction

use stellar_xdr::curr::{
    Asset, Memo, MuxedAccount, Operation, OperationBody, PaymentOp, Preconditions, SequenceNumber,
    SetOptionsOp, Signer, SignerKey, Transaction, TransactionExt, Uint256, VecM,
};

use crate::account::Address;
use crate::crypto::keys::stellar::decode_public_key;
use crate::error::{Error, Result};
use crate::horizon::AccountRecord;
use super::envelope::Envelope;

/// Fee per operation in stroops
pub const BASE_FEE: u32 = 100;

/// Weights and thresholds that make an account require two signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultisigOptions {
    /// Weight of the added signer
    pub signer_weight: u8,
    /// Weight of the account's own key
    pub master_weight: u8,
    /// Threshold for low security operations
    pub low_threshold: u8,
    /// Threshold for medium security operations, payments included
    pub med_threshold: u8,
    /// Threshold for high security operations, set options included
    pub high_threshold: u8,
}

impl Default for MultisigOptions {
    fn default() -> Self {
        Self {
            signer_weight: 1,
            master_weight: 1,
            low_threshold: 1,
            med_threshold: 2,
            high_threshold: 2,
        }
    }
}

impl MultisigOptions {
    /// Whether the master key and the signer together reach every threshold
    pub fn is_reachable(&self) -> bool {
        let combined = u16::from(self.master_weight) + u16::from(self.signer_weight);
        [self.low_threshold, self.med_threshold, self.high_threshold]
            .iter()
            .all(|threshold| u16::from(*threshold) <= combined)
    }
}

/// Builds a transaction for a loaded source account
pub struct TransactionBuilder {
    source: [u8; 32],
    sequence: i64,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    /// Start a transaction that consumes the account's next sequence number
    pub fn new(source: &AccountRecord) -> Result<Self> {
        let sequence = source.sequence.checked_add(1).ok_or_else(|| {
            Error::Transaction(format!("Sequence number of {} is exhausted", source.account_id))
        })?;

        Ok(Self {
            source: decode_public_key(&source.account_id)?,
            sequence,
            operations: Vec::new(),
        })
    }

    /// Send `amount` stroops of XLM to `destination`
    pub fn payment(mut self, destination: &Address, amount: i64) -> Result<Self> {
        if amount <= 0 {
            return Err(Error::Transaction("Payment amount must be positive".to_string()));
        }

        self.operations.push(operation(OperationBody::Payment(PaymentOp {
            destination: MuxedAccount::Ed25519(Uint256(*destination.public_key())),
            asset: Asset::Native,
            amount,
        })));
        Ok(self)
    }

    /// Add `signer` to the account and set weights and thresholds
    ///
    /// Uses two set-options operations: one adding the signer, one setting
    /// the master weight and thresholds.
    pub fn multisig(mut self, signer: &Address, options: &MultisigOptions) -> Result<Self> {
        if signer.public_key() == &self.source {
            return Err(Error::Transaction(
                "The additional signer must differ from the account key".to_string(),
            ));
        }
        if !options.is_reachable() {
            return Err(Error::Transaction(format!(
                "Thresholds {}/{}/{} exceed the combined signer weight {}",
                options.low_threshold,
                options.med_threshold,
                options.high_threshold,
                u16::from(options.master_weight) + u16::from(options.signer_weight)
            )));
        }

        self.operations.push(operation(OperationBody::SetOptions(SetOptionsOp {
            signer: Some(Signer {
                key: SignerKey::Ed25519(Uint256(*signer.public_key())),
                weight: u32::from(options.signer_weight),
            }),
            ..empty_set_options()
        })));
        self.operations.push(operation(OperationBody::SetOptions(SetOptionsOp {
            master_weight: Some(u32::from(options.master_weight)),
            low_threshold: Some(u32::from(options.low_threshold)),
            med_threshold: Some(u32::from(options.med_threshold)),
            high_threshold: Some(u32::from(options.high_threshold)),
            ..empty_set_options()
        })));
        Ok(self)
    }

    /// Produce the unsigned envelope
    pub fn build(self) -> Result<Envelope> {
        if self.operations.is_empty() {
            return Err(Error::Transaction("Transaction has no operations".to_string()));
        }

        let fee = u32::try_from(self.operations.len())
            .ok()
            .and_then(|count| count.checked_mul(BASE_FEE))
            .ok_or_else(|| Error::Transaction("Transaction fee overflows".to_string()))?;

        let operations: VecM<Operation, 100> = self
            .operations
            .try_into()
            .map_err(|e| Error::Transaction(format!("Too many operations: {}", e)))?;

        Ok(Envelope::unsigned(Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(self.source)),
            fee,
            seq_num: SequenceNumber(self.sequence),
            cond: Preconditions::None,
            memo: Memo::None,
            operations,
            ext: TransactionExt::V0,
        }))
    }
}

fn operation(body: OperationBody) -> Operation {
    Operation {
        source_account: None,
        body,
    }
}

fn empty_set_options() -> SetOptionsOp {
    SetOptionsOp {
        inflation_dest: None,
        clear_flags: None,
        set_flags: None,
        master_weight: None,
        low_threshold: None,
        med_threshold: None,
        high_threshold: None,
        home_domain: None,
        signer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::crypto::keys::KeyPair;

    fn record(key_pair: &KeyPair, sequence: i64) -> AccountRecord {
        serde_json::from_value(serde_json::json!({
            "account_id": key_pair.public_key(),
            "sequence": sequence.to_string(),
        }))
        .unwrap()
    }

    fn keys() -> (KeyPair, KeyPair) {
        (KeyPair::from_seed_bytes(&[1u8; 32]), KeyPair::from_seed_bytes(&[2u8; 32]))
    }

    #[test]
    fn test_payment_transaction() {
        let (source, destination) = keys();
        let destination = Address::new(&destination.public_key()).unwrap();

        let envelope = TransactionBuilder::new(&record(&source, 41))
            .unwrap()
            .payment(&destination, 992_000_000)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(envelope.source_account(), source.public_key());
        assert_eq!(envelope.sequence(), 42);
        assert_eq!(envelope.fee(), BASE_FEE);
        assert_eq!(envelope.operation_count(), 1);
        assert_eq!(envelope.signature_count(), 0);

        match &envelope.transaction().operations[0].body {
            OperationBody::Payment(payment) => {
                assert_eq!(payment.amount, 992_000_000);
                assert_eq!(payment.asset, Asset::Native);
            }
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_multisig_operations() {
        let (source, signer) = keys();
        let signer = Address::new(&signer.public_key()).unwrap();

        let envelope = TransactionBuilder::new(&record(&source, 1))
            .unwrap()
            .multisig(&signer, &MultisigOptions::default())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(envelope.operation_count(), 2);
        assert_eq!(envelope.fee(), 2 * BASE_FEE);

        let operations = &envelope.transaction().operations;
        match (&operations[0].body, &operations[1].body) {
            (OperationBody::SetOptions(add), OperationBody::SetOptions(weights)) => {
                let added = add.signer.as_ref().unwrap();
                assert_eq!(added.key, SignerKey::Ed25519(Uint256(*signer.public_key())));
                assert_eq!(added.weight, 1);
                assert_eq!(add.master_weight, None);

                assert_eq!(weights.master_weight, Some(1));
                assert_eq!(weights.low_threshold, Some(1));
                assert_eq!(weights.med_threshold, Some(2));
                assert_eq!(weights.high_threshold, Some(2));
                assert!(weights.signer.is_none());
            }
            other => panic!("unexpected operations: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_transactions() {
        let (source, other) = keys();
        let own = Address::new(&source.public_key()).unwrap();
        let other = Address::new(&other.public_key()).unwrap();
        let builder = || TransactionBuilder::new(&record(&source, 1)).unwrap();

        assert!(builder().build().is_err());
        assert!(builder().payment(&other, 0).is_err());
        assert!(builder().multisig(&own, &MultisigOptions::default()).is_err());

        let unreachable = MultisigOptions { high_threshold: 3, ..Default::default() };
        assert!(builder().multisig(&other, &unreachable).is_err());

        assert!(TransactionBuilder::new(&record(&source, i64::MAX)).is_err());
    }

    #[test]
    fn test_signing() {
        let (source, co_signer) = keys();
        let destination = Address::new(&co_signer.public_key()).unwrap();
        let mut envelope = TransactionBuilder::new(&record(&source, 1))
            .unwrap()
            .payment(&destination, 1)
            .unwrap()
            .build()
            .unwrap();

        envelope.sign(&source, Network::Testnet).unwrap();
        // Repeated signatures by one key are not added twice
        envelope.sign(&source, Network::Testnet).unwrap();
        assert_eq!(envelope.signature_count(), 1);
        assert!(envelope.is_signed_by(&source.public_key_bytes(), Network::Testnet).unwrap());
        assert!(!envelope.is_signed_by(&co_signer.public_key_bytes(), Network::Testnet).unwrap());
        // Signatures are bound to the network passphrase
        assert!(!envelope.is_signed_by(&source.public_key_bytes(), Network::Public).unwrap());

        envelope.sign(&co_signer, Network::Testnet).unwrap();
        assert_eq!(envelope.signature_count(), 2);

        let decoded = Envelope::from_base64(&envelope.to_base64().unwrap()).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.hash_hex(Network::Testnet).unwrap().len(), 64);
    }

    #[test]
    fn test_rejects_malformed_envelopes() {
        assert!(matches!(Envelope::from_base64("%%%"), Err(Error::Transaction(_))));
        assert!(matches!(Envelope::from_base64("AAAA"), Err(Error::Transaction(_))));
    }
}
