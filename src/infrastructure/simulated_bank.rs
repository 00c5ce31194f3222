use crate::domain::banking::{
    BalanceQuery, BalanceSnapshot, BillPayment, BillReceipt, HistoryItem, HistoryQuery,
    TransactionHistory, TransferOrder, TransferReceipt,
};
use crate::domain::ports::BankingBackend;
use crate::error::BackendError;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// A posted debit.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub tx_id: String,
    pub from_account: String,
    /// Destination account or biller.
    pub to_account: String,
    pub amount: Decimal,
    pub created_at: String,
}

#[derive(Debug, Default)]
struct BankState {
    accounts: RwLock<HashMap<String, Decimal>>,
    ledger: RwLock<Vec<LedgerEntry>>,
    next_tx: AtomicU64,
    latency_ms: AtomicU64,
    offline: AtomicBool,
}

/// In-process stand-in for the banking API.
///
/// Debits fail with status 400 when funds are short and 404 for unknown
/// source accounts. Latency and outages can be switched on to exercise the
/// caller's timeout and error paths. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct SimulatedBank {
    state: Arc<BankState>,
}

impl SimulatedBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts used by the demo conversation scripts.
    pub fn demo() -> Self {
        let accounts = HashMap::from([
            ("acct_savings_1".to_string(), dec!(25000)),
            ("acct_current_2".to_string(), dec!(8000)),
            ("acct_friend_riya".to_string(), dec!(1200)),
        ]);
        Self {
            state: Arc::new(BankState {
                accounts: RwLock::new(accounts),
                ..BankState::default()
            }),
        }
    }

    pub async fn set_balance(&self, account_id: &str, balance: Decimal) {
        self.state
            .accounts
            .write()
            .await
            .insert(account_id.to_string(), balance);
    }

    pub async fn balance_of(&self, account_id: &str) -> Option<Decimal> {
        self.state.accounts.read().await.get(account_id).copied()
    }

    pub async fn ledger(&self) -> Vec<LedgerEntry> {
        self.state.ledger.read().await.clone()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// While offline every call fails with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.state.offline.store(offline, Ordering::Relaxed);
    }

    async fn network(&self) -> Result<(), BackendError> {
        let latency = self.state.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.state.offline.load(Ordering::Relaxed) {
            return Err(BackendError::Connection("connection refused".into()));
        }
        Ok(())
    }

    async fn debit(&self, from: &str, to: &str, amount: Decimal) -> Result<LedgerEntry, BackendError> {
        if amount <= Decimal::ZERO {
            return Err(BackendError::Status(400));
        }

        let mut accounts = self.state.accounts.write().await;
        let available = accounts.get(from).copied().ok_or(BackendError::Status(404))?;
        if available < amount {
            return Err(BackendError::Status(400));
        }
        accounts.insert(from.to_string(), available - amount);
        if let Some(balance) = accounts.get_mut(to) {
            *balance += amount;
        }
        drop(accounts);

        let n = self.state.next_tx.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = LedgerEntry {
            tx_id: format!("TXN{n:06}"),
            from_account: from.to_string(),
            to_account: to.to_string(),
            amount,
            created_at: Utc::now().format("%Y-%m-%d").to_string(),
        };
        self.state.ledger.write().await.push(entry.clone());
        info!(tx_id = %entry.tx_id, from, to, %amount, "Simulated debit posted");
        Ok(entry)
    }
}

#[async_trait]
impl BankingBackend for SimulatedBank {
    async fn balance(&self, query: &BalanceQuery) -> Result<BalanceSnapshot, BackendError> {
        self.network().await?;
        let balance = self
            .balance_of(&query.account_id)
            .await
            .ok_or(BackendError::Status(404))?;
        Ok(BalanceSnapshot {
            balance,
            currency: "INR".to_string(),
        })
    }

    async fn transfer(&self, order: &TransferOrder) -> Result<TransferReceipt, BackendError> {
        self.network().await?;
        let entry = self
            .debit(&order.from_account, &order.to_account, order.amount)
            .await?;
        Ok(TransferReceipt {
            signed_token: Some(format!("sim.{}.{}", entry.tx_id, order.user_id)),
            tx_id: entry.tx_id,
        })
    }

    async fn pay_bill(&self, payment: &BillPayment) -> Result<BillReceipt, BackendError> {
        self.network().await?;
        let entry = self
            .debit(&payment.from_account, &payment.biller_id, payment.amount)
            .await?;
        Ok(BillReceipt { tx_id: entry.tx_id })
    }

    async fn transactions(&self, query: &HistoryQuery) -> Result<TransactionHistory, BackendError> {
        self.network().await?;
        let ledger = self.state.ledger.read().await;
        let items = ledger
            .iter()
            .rev()
            .filter(|entry| entry.from_account == query.from_account)
            .map(|entry| HistoryItem {
                amount: entry.amount,
                to_account: entry.to_account.clone(),
                created_at: entry.created_at.clone(),
            })
            .collect();
        Ok(TransactionHistory { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::turn::AuthContext;

    fn order(amount: Decimal) -> TransferOrder {
        TransferOrder {
            user_id: "cust_1".into(),
            from_account: "acct_savings_1".into(),
            to_account: "acct_friend_riya".into(),
            amount,
            currency: "INR".into(),
            auth: AuthContext::for_user("cust_1"),
            note: "voice_upi_transfer".into(),
        }
    }

    #[tokio::test]
    async fn test_transfer_moves_funds_and_records_ledger() {
        let bank = SimulatedBank::demo();
        let receipt = bank.transfer(&order(dec!(6000))).await.unwrap();

        assert_eq!(receipt.tx_id, "TXN000001");
        assert!(receipt.signed_token.is_some());
        assert_eq!(bank.balance_of("acct_savings_1").await, Some(dec!(19000)));
        assert_eq!(bank.balance_of("acct_friend_riya").await, Some(dec!(7200)));
        assert_eq!(bank.ledger().await.len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_rejected() {
        let bank = SimulatedBank::demo();
        assert_eq!(
            bank.transfer(&order(dec!(25000.01))).await,
            Err(BackendError::Status(400))
        );
        assert!(bank.ledger().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let bank = SimulatedBank::demo();
        bank.transfer(&order(dec!(100))).await.unwrap();
        bank.transfer(&order(dec!(200))).await.unwrap();

        let history = bank
            .transactions(&HistoryQuery {
                user_id: "cust_1".into(),
                from_account: "acct_savings_1".into(),
                auth: AuthContext::default(),
            })
            .await
            .unwrap();
        assert_eq!(history.items.len(), 2);
        assert_eq!(history.items[0].amount, dec!(200));
    }

    #[tokio::test]
    async fn test_offline_bank_refuses_connections() {
        let bank = SimulatedBank::demo();
        bank.set_offline(true);
        let query = BalanceQuery {
            user_id: "cust_1".into(),
            account_id: "acct_savings_1".into(),
            auth: AuthContext::default(),
        };
        assert!(matches!(
            bank.balance(&query).await,
            Err(BackendError::Connection(_))
        ));
    }
}
