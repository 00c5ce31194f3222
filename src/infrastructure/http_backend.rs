use crate::domain::banking::{
    BalanceQuery, BalanceSnapshot, BillPayment, BillReceipt, HistoryQuery, TransactionHistory,
    TransferOrder, TransferReceipt,
};
use crate::domain::ports::BankingBackend;
use crate::error::BackendError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON-over-HTTP client for the secure banking API.
///
/// Each call is a single POST. Timeouts are enforced by the caller.
#[derive(Debug, Clone)]
pub struct HttpBankingBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBankingBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "Calling banking API");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl BankingBackend for HttpBankingBackend {
    async fn balance(&self, query: &BalanceQuery) -> Result<BalanceSnapshot, BackendError> {
        self.post("balance", query).await
    }

    async fn transfer(&self, order: &TransferOrder) -> Result<TransferReceipt, BackendError> {
        self.post("transfer", order).await
    }

    async fn pay_bill(&self, payment: &BillPayment) -> Result<BillReceipt, BackendError> {
        self.post("paybill", payment).await
    }

    async fn transactions(&self, query: &HistoryQuery) -> Result<TransactionHistory, BackendError> {
        self.post("transactions", query).await
    }
}
