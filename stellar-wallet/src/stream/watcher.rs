//! Polling payment watcher

use tracing::debug;

use crate::account::Address;
use crate::error::Result;
use crate::horizon::{HorizonClient, PaymentRecord};
use super::cursor::CursorStore;

/// Records requested per poll
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Follows the payments received by one account
pub struct PaymentWatcher {
    client: HorizonClient,
    account: Address,
    cursor: Option<String>,
    store: Option<CursorStore>,
    page_size: u32,
}

impl PaymentWatcher {
    /// Watch `account` from its first payment
    pub fn new(client: HorizonClient, account: Address) -> Self {
        Self {
            client,
            account,
            cursor: None,
            store: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Start after `cursor` instead of the first payment
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Persist the cursor in `store`, resuming from its saved token
    ///
    /// A saved token takes precedence over one given with `with_cursor`.
    pub fn with_store(mut self, store: CursorStore) -> Self {
        if let Some(token) = store.get(self.account.as_str()) {
            self.cursor = Some(token.to_string());
        }
        self.store = Some(store);
        self
    }

    /// Current position in the payment history
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Fetch the next page and return the payments the account received
    ///
    /// The cursor advances past every fetched record, outgoing ones included.
    pub async fn poll(&mut self) -> Result<Vec<PaymentRecord>> {
        let records = self
            .client
            .payments(self.account.as_str(), self.cursor.as_deref(), self.page_size)
            .await?;

        let Some(last) = records.last() else {
            return Ok(Vec::new());
        };
        let token = last.paging_token.clone();

        if let Some(store) = &mut self.store {
            store.set(self.account.as_str(), &token)?;
        }
        debug!(account = self.account.as_str(), fetched = records.len(), %token, "Advanced payment cursor");
        self.cursor = Some(token);

        Ok(records
            .into_iter()
            .filter(|record| record.recipient() == Some(self.account.as_str()))
            .collect())
    }
}
