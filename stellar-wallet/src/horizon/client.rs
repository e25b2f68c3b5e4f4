//! Horizon HTTP client

use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, info};

use crate::config::HorizonConfig;
use crate::crypto::keys::stellar::decode_public_key;
use crate::error::{Error, Result};
use crate::transaction::Envelope;
use super::types::{AccountRecord, FundResult, Page, PaymentRecord, Problem, SubmitResult};

/// Largest page Horizon serves
pub const MAX_PAGE_SIZE: u32 = 200;

/// Client for a Horizon-compatible server
pub struct HorizonClient {
    /// Client configuration
    config: HorizonConfig,
    /// HTTP client
    client: reqwest::Client,
}

impl HorizonClient {
    /// Create a new Horizon client
    pub fn new(config: HorizonConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("stellar-wallet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    /// Fetch the current state of an account
    ///
    /// The account id is validated before any request is sent.
    pub async fn account(&self, account_id: &str) -> Result<AccountRecord> {
        decode_public_key(account_id)?;
        let account_id = account_id.trim();

        let url = self.config.horizon_endpoint(&format!("accounts/{}", account_id))?;
        debug!(%url, "Loading account");

        let (status, body) = send(self.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(account_id.to_string()));
        }
        if !status.is_success() {
            return Err(problem_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Serialization(format!("Failed to parse account: {}", e)))
    }

    /// Payments involving an account, oldest first, after `cursor`
    pub async fn payments(
        &self,
        account_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PaymentRecord>> {
        decode_public_key(account_id)?;
        let account_id = account_id.trim();

        let mut url = self.config.horizon_endpoint(&format!("accounts/{}/payments", account_id))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("order", "asc");
            query.append_pair("limit", &limit.clamp(1, MAX_PAGE_SIZE).to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        debug!(%url, "Loading payments");

        let (status, body) = send(self.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(account_id.to_string()));
        }
        if !status.is_success() {
            return Err(problem_error(status, &body));
        }

        let page: Page<PaymentRecord> = serde_json::from_str(&body)
            .map_err(|e| Error::Serialization(format!("Failed to parse payments: {}", e)))?;
        Ok(page.embedded.records)
    }

    /// Submit a signed transaction
    pub async fn submit_transaction(&self, envelope: &Envelope) -> Result<SubmitResult> {
        let url = self.config.horizon_endpoint("transactions")?;
        let tx = envelope.to_base64()?;
        debug!(%url, signatures = envelope.signature_count(), "Submitting transaction");

        let (status, body) = send(self.client.post(url).form(&[("tx", tx.as_str())])).await?;

        if !status.is_success() {
            return Err(problem_error(status, &body));
        }

        let result: SubmitResult = serde_json::from_str(&body)
            .map_err(|e| Error::Serialization(format!("Failed to parse submission: {}", e)))?;
        info!(hash = %result.hash, ledger = ?result.ledger, "Transaction submitted");

        Ok(result)
    }

    /// Ask friendbot to create and fund a test network account
    pub async fn fund_with_friendbot(&self, account_id: &str) -> Result<FundResult> {
        if !self.config.network.has_friendbot() {
            return Err(Error::NotSupported(format!(
                "Friendbot is not available on the {} network",
                self.config.network
            )));
        }
        decode_public_key(account_id)?;
        let account_id = account_id.trim();

        let mut url = self.config.friendbot_url.clone();
        url.query_pairs_mut().append_pair("addr", account_id);
        debug!(%url, "Requesting friendbot funding");

        let (status, body) = send(self.client.get(url)).await?;

        if !status.is_success() {
            return Err(problem_error(status, &body));
        }

        let hash = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("hash").and_then(|h| h.as_str()).map(str::to_string));

        info!(account_id, "Account funded by friendbot");

        Ok(FundResult {
            account_id: account_id.to_string(),
            hash,
        })
    }
}

async fn send(request: RequestBuilder) -> Result<(StatusCode, String)> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::Network(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

    Ok((status, body))
}

fn problem_error(status: StatusCode, body: &str) -> Error {
    let problem: Problem = serde_json::from_str(body).unwrap_or_default();

    let title = if problem.title.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        problem.title.clone()
    };

    Error::Horizon {
        status: status.as_u16(),
        title,
        detail: problem.describe(),
    }
}
