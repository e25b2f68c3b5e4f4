//! Horizon response models

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize};

/// Account record returned by `GET /accounts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account id (`G...`)
    pub account_id: String,
    /// Current sequence number
    #[serde(deserialize_with = "deserialize_sequence")]
    pub sequence: i64,
    /// Number of subentries (trustlines, offers, signers, data)
    #[serde(default)]
    pub subentry_count: u32,
    /// Home domain, if set
    #[serde(default)]
    pub home_domain: Option<String>,
    /// Signing thresholds
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Account flags
    #[serde(default)]
    pub flags: Flags,
    /// Balances, native first as Horizon orders them
    #[serde(default)]
    pub balances: Vec<Balance>,
    /// Signers, including the master key
    #[serde(default)]
    pub signers: Vec<Signer>,
    /// Data entries, values base64-encoded
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Horizon encodes int64 values as JSON strings; accept both forms.
fn deserialize_sequence<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse().map_err(serde::de::Error::custom),
        StringOrInt::Int(i) => Ok(i),
    }
}

/// One balance line of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount with 7 decimal places, kept verbatim
    pub balance: String,
    /// `native`, `credit_alphanum4`, `credit_alphanum12` or `liquidity_pool_shares`
    pub asset_type: String,
    /// Asset code for credit assets
    #[serde(default)]
    pub asset_code: Option<String>,
    /// Issuer for credit assets
    #[serde(default)]
    pub asset_issuer: Option<String>,
    /// Trustline limit for credit assets and pool shares
    #[serde(default)]
    pub limit: Option<String>,
    /// Pool id for liquidity pool shares
    #[serde(default)]
    pub liquidity_pool_id: Option<String>,
}

impl Balance {
    /// Whether this is the XLM balance
    pub fn is_native(&self) -> bool {
        self.asset_type == "native"
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.asset_type.as_str() {
            "native" => write!(f, "{} XLM", self.balance),
            "liquidity_pool_shares" => write!(
                f,
                "{} pool:{}",
                self.balance,
                self.liquidity_pool_id.as_deref().unwrap_or("?")
            ),
            _ => write!(
                f,
                "{} {}:{}",
                self.balance,
                self.asset_code.as_deref().unwrap_or("?"),
                self.asset_issuer.as_deref().unwrap_or("?")
            ),
        }
    }
}

/// Account authorization flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub auth_revocable: bool,
    #[serde(default)]
    pub auth_immutable: bool,
    #[serde(default)]
    pub auth_clawback_enabled: bool,
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "auth_required={}, auth_revocable={}, auth_immutable={}, auth_clawback_enabled={}",
            self.auth_required, self.auth_revocable, self.auth_immutable, self.auth_clawback_enabled
        )
    }
}

/// Signing thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub low_threshold: u8,
    #[serde(default)]
    pub med_threshold: u8,
    #[serde(default)]
    pub high_threshold: u8,
}

/// An account signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Signer key (`G...`, `T...` or `X...`)
    pub key: String,
    /// Signing weight
    pub weight: u32,
    /// Key type, e.g. `ed25519_public_key`
    #[serde(rename = "type")]
    pub signer_type: String,
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (weight {}, {})", self.key, self.weight, self.signer_type)
    }
}

/// Render a base64 data value, as text when it decodes to UTF-8
pub fn decode_data_value(value: &str) -> String {
    STANDARD
        .decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| value.to_string())
}

/// Problem document Horizon returns for errors
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    /// Present on failed transaction submissions
    #[serde(default)]
    pub extras: Option<ProblemExtras>,
}

impl Problem {
    /// Detail text followed by any transaction result codes
    pub fn describe(&self) -> String {
        let codes = self
            .extras
            .as_ref()
            .and_then(|extras| extras.result_codes.as_ref())
            .map(ResultCodes::to_string);

        match codes {
            Some(codes) if self.detail.is_empty() => codes,
            Some(codes) => format!("{} ({})", self.detail, codes),
            None => self.detail.clone(),
        }
    }
}

/// Extra fields of a failed submission problem
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemExtras {
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
}

/// Result codes of a failed transaction and its operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultCodes {
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transaction)?;
        if !self.operations.is_empty() {
            write!(f, ": {}", self.operations.join(", "))?;
        }
        Ok(())
    }
}

/// Result of a friendbot funding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundResult {
    /// Account that was funded
    pub account_id: String,
    /// Hash of the create-account transaction, when reported
    pub hash: Option<String>,
}

/// Response of `POST /transactions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Transaction hash (hex)
    pub hash: String,
    /// Ledger the transaction was included in
    #[serde(default)]
    pub ledger: Option<u32>,
    /// Whether the transaction succeeded
    #[serde(default = "default_successful")]
    pub successful: bool,
    /// Submitted envelope, base64 XDR
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    /// Transaction result, base64 XDR
    #[serde(default)]
    pub result_xdr: Option<String>,
}

fn default_successful() -> bool {
    true
}

/// Page of records as returned by Horizon collection endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
}

/// Embedded records of a page
#[derive(Debug, Clone, Deserialize)]
pub struct Embedded<T> {
    pub records: Vec<T>,
}

/// A payment-like operation from `GET /accounts/{id}/payments`
///
/// Covers `payment`, the path payments, `create_account` and
/// `account_merge`; fields a type does not use are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    /// Cursor for resuming after this record
    pub paging_token: String,
    /// Operation type, e.g. `payment` or `create_account`
    #[serde(rename = "type")]
    pub payment_type: String,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
    /// `create_account` only
    #[serde(default)]
    pub funder: Option<String>,
    /// Created account for `create_account`, merged account for `account_merge`
    #[serde(default)]
    pub account: Option<String>,
    /// `create_account` only
    #[serde(default)]
    pub starting_balance: Option<String>,
    /// `account_merge` only
    #[serde(default)]
    pub into: Option<String>,
}

impl PaymentRecord {
    /// Account that received the funds
    pub fn recipient(&self) -> Option<&str> {
        match self.payment_type.as_str() {
            "create_account" => self.account.as_deref(),
            "account_merge" => self.into.as_deref(),
            _ => self.to.as_deref(),
        }
    }

    /// Account the funds came from
    pub fn sender(&self) -> Option<&str> {
        match self.payment_type.as_str() {
            "create_account" => self.funder.as_deref(),
            "account_merge" => self.account.as_deref(),
            _ => self.from.as_deref(),
        }
    }

    /// Amount moved, when the record carries one
    pub fn amount(&self) -> Option<&str> {
        match self.payment_type.as_str() {
            "create_account" => self.starting_balance.as_deref(),
            _ => self.amount.as_deref(),
        }
    }

    /// Asset name: `lumens` for XLM, `CODE:ISSUER` otherwise
    pub fn asset(&self) -> String {
        match self.asset_type.as_deref() {
            None | Some("native") => "lumens".to_string(),
            Some(_) => format!(
                "{}:{}",
                self.asset_code.as_deref().unwrap_or("?"),
                self.asset_issuer.as_deref().unwrap_or("?")
            ),
        }
    }
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from {} token: {}",
            self.amount().unwrap_or("?"),
            self.asset(),
            self.sender().unwrap_or("?"),
            self.paging_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_JSON: &str = r#"{
        "id": "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6",
        "account_id": "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6",
        "sequence": "12345",
        "subentry_count": 2,
        "thresholds": { "low_threshold": 0, "med_threshold": 1, "high_threshold": 2 },
        "flags": { "auth_required": false, "auth_revocable": true, "auth_immutable": false, "auth_clawback_enabled": false },
        "balances": [
            { "balance": "25.5000000", "limit": "1000.0000000", "asset_type": "credit_alphanum4",
              "asset_code": "USD", "asset_issuer": "GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5" },
            { "balance": "100.0000000", "asset_type": "native" }
        ],
        "signers": [
            { "weight": 1, "key": "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6", "type": "ed25519_public_key" }
        ],
        "data": { "greeting": "aGVsbG8=" }
    }"#;

    #[test]
    fn test_parse_account_record() {
        let record: AccountRecord = serde_json::from_str(ACCOUNT_JSON).unwrap();
        assert_eq!(record.sequence, 12345);
        assert_eq!(record.subentry_count, 2);
        assert_eq!(record.thresholds.high_threshold, 2);
        assert!(record.flags.auth_revocable);
        assert_eq!(record.balances.len(), 2);
        assert!(record.balances[1].is_native());
        assert_eq!(record.signers[0].signer_type, "ed25519_public_key");
        assert_eq!(record.data.get("greeting").map(String::as_str), Some("aGVsbG8="));
    }

    #[test]
    fn test_sequence_accepts_number() {
        let json = r#"{ "account_id": "GABC", "sequence": 42 }"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sequence, 42);
        assert_eq!(record.flags, Flags::default());
        assert!(record.balances.is_empty());
    }

    #[test]
    fn test_display_formats() {
        let record: AccountRecord = serde_json::from_str(ACCOUNT_JSON).unwrap();
        assert_eq!(record.balances[1].to_string(), "100.0000000 XLM");
        assert_eq!(
            record.balances[0].to_string(),
            "25.5000000 USD:GBBD47IF6LWK7P7MDEVSCWR7DPUWV3NY3DTQEVFL4NAT4AQH3ZLLFLA5"
        );
        assert_eq!(
            record.flags.to_string(),
            "auth_required=false, auth_revocable=true, auth_immutable=false, auth_clawback_enabled=false"
        );
        assert_eq!(
            record.signers[0].to_string(),
            "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6 (weight 1, ed25519_public_key)"
        );
    }

    #[test]
    fn test_pool_share_display() {
        let balance = Balance {
            balance: "3.0000000".to_string(),
            asset_type: "liquidity_pool_shares".to_string(),
            asset_code: None,
            asset_issuer: None,
            limit: Some("10.0000000".to_string()),
            liquidity_pool_id: Some("abcd".to_string()),
        };
        assert_eq!(balance.to_string(), "3.0000000 pool:abcd");
    }

    #[test]
    fn test_decode_data_value() {
        assert_eq!(decode_data_value("aGVsbG8="), "hello");
        // Not base64: left untouched
        assert_eq!(decode_data_value("%%%"), "%%%");
        // Valid base64 but not UTF-8: left as base64
        assert_eq!(decode_data_value("/w=="), "/w==");
    }

    const PAYMENTS_JSON: &str = r#"{
        "_embedded": { "records": [
            { "id": "100", "paging_token": "100", "type": "create_account",
              "funder": "GFUNDER", "account": "GRECEIVER", "starting_balance": "10000.0000000" },
            { "id": "101", "paging_token": "101", "type": "payment", "from": "GSENDER",
              "to": "GRECEIVER", "amount": "99.2000000", "asset_type": "native" },
            { "id": "102", "paging_token": "102", "type": "payment", "from": "GRECEIVER",
              "to": "GOTHER", "amount": "5.0000000", "asset_type": "credit_alphanum4",
              "asset_code": "USD", "asset_issuer": "GISSUER" }
        ] }
    }"#;

    #[test]
    fn test_parse_payments_page() {
        let page: Page<PaymentRecord> = serde_json::from_str(PAYMENTS_JSON).unwrap();
        let records = page.embedded.records;
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].recipient(), Some("GRECEIVER"));
        assert_eq!(records[0].sender(), Some("GFUNDER"));
        assert_eq!(records[0].amount(), Some("10000.0000000"));

        assert_eq!(records[1].to_string(), "99.2000000 lumens from GSENDER token: 101");
        assert_eq!(records[2].asset(), "USD:GISSUER");
        assert_eq!(records[2].recipient(), Some("GOTHER"));
    }

    #[test]
    fn test_problem_result_codes() {
        let problem: Problem = serde_json::from_str(
            r#"{"title":"Transaction Failed","status":400,"detail":"The transaction failed.",
                "extras":{"result_codes":{"transaction":"tx_failed","operations":["op_underfunded"]}}}"#,
        )
        .unwrap();
        assert_eq!(problem.describe(), "The transaction failed. (tx_failed: op_underfunded)");

        let problem: Problem = serde_json::from_str(r#"{"title":"Bad","detail":"nope"}"#).unwrap();
        assert_eq!(problem.describe(), "nope");
    }

    #[test]
    fn test_submit_result_defaults() {
        let result: SubmitResult = serde_json::from_str(r#"{"hash":"abc","ledger":7}"#).unwrap();
        assert_eq!(result.hash, "abc");
        assert_eq!(result.ledger, Some(7));
        assert!(result.successful);
    }
}
