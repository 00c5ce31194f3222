//! Request and response bodies of the banking API.

use super::turn::AuthContext;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "INR".to_string()
}

fn missing_tx_id() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceQuery {
    pub user_id: String,
    pub account_id: String,
    pub auth: AuthContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOrder {
    pub user_id: String,
    pub from_account: String,
    pub to_account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub auth: AuthContext,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    #[serde(default = "missing_tx_id")]
    pub tx_id: String,
    #[serde(default)]
    pub signed_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPayment {
    pub user_id: String,
    pub from_account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub auth: AuthContext,
    pub biller_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillReceipt {
    #[serde(default = "missing_tx_id")]
    pub tx_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
    pub from_account: String,
    pub auth: AuthContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub amount: Decimal,
    #[serde(default)]
    pub to_account: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistory {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_transfer_order_sends_amount_as_number() {
        let order = TransferOrder {
            user_id: "cust_1".into(),
            from_account: "acct_a".into(),
            to_account: "acct_b".into(),
            amount: dec!(6000),
            currency: "INR".into(),
            auth: AuthContext::for_user("cust_1"),
            note: "voice_upi_transfer".into(),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["amount"], json!(6000.0));
        assert_eq!(value["auth"]["user_id"], json!("cust_1"));
    }

    #[test]
    fn test_responses_tolerate_missing_fields() {
        let snapshot: BalanceSnapshot = serde_json::from_value(json!({"balance": 1520.75})).unwrap();
        assert_eq!(snapshot.balance, dec!(1520.75));
        assert_eq!(snapshot.currency, "INR");

        let receipt: TransferReceipt = serde_json::from_value(json!({})).unwrap();
        assert_eq!(receipt.tx_id, "N/A");
        assert_eq!(receipt.signed_token, None);

        let history: TransactionHistory = serde_json::from_value(json!({})).unwrap();
        assert!(history.items.is_empty());
    }

    #[test]
    fn test_balance_accepts_string_amounts() {
        let snapshot: BalanceSnapshot =
            serde_json::from_value(json!({"balance": "250.00", "currency": "INR"})).unwrap();
        assert_eq!(snapshot.balance, dec!(250));
    }
}
