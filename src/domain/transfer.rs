use super::money::AmountSource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Transfers strictly above this amount need a one-time code.
pub const DEFAULT_OTP_THRESHOLD: Decimal = dec!(5000);

/// Substituted when a transfer amount cannot be parsed.
pub const DEFAULT_FALLBACK_AMOUNT: Decimal = dec!(500);

/// Where a transfer request stands with respect to re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferState {
    /// At or below the threshold, no challenge needed.
    Direct,
    /// Above the threshold and waiting for the subject's code.
    AwaitingOtp,
    /// Code accepted; the staged transfer is replayed.
    Resuming,
    /// Challenge expired or exhausted. A new transfer request starts over.
    Locked,
}

/// Transfer parameters resolved for the current turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub subject_id: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub amount_source: AmountSource,
    pub currency: String,
}

/// A transfer parked in the session while the subject proves possession of
/// the one-time code.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransfer {
    pub subject_id: String,
    pub amount: Decimal,
    pub from_account: String,
    pub to_account: String,
    pub currency: String,
    pub staged_at: DateTime<Utc>,
}

impl PendingTransfer {
    pub fn from_request(request: &TransferRequest, staged_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: request.subject_id.clone(),
            amount: request.amount.normalize(),
            from_account: request.from_account.clone(),
            to_account: request.to_account.clone(),
            currency: request.currency.clone(),
            staged_at,
        }
    }

    /// Whether `request` asks for exactly this transfer.
    pub fn matches(&self, request: &TransferRequest) -> bool {
        self.subject_id == request.subject_id
            && self.amount == request.amount
            && self.from_account == request.from_account
            && self.to_account == request.to_account
            && self.currency == request.currency
    }
}
