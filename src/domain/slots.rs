use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Slot names shared with the dialogue engine's domain file.
pub mod keys {
    pub const USER_ID: &str = "user_id";
    pub const ACCOUNT_ID: &str = "account_id";
    pub const FROM_ACCOUNT: &str = "from_account";
    pub const TO_ACCOUNT: &str = "to_account";
    pub const AMOUNT: &str = "amount";
    pub const CURRENCY: &str = "currency";
    pub const LAST_TX_ID: &str = "last_tx_id";
    pub const LAST_TX_TOKEN: &str = "last_tx_token";

    pub const OTP_VERIFIED: &str = "otp_verified";
    pub const AWAITING_OTP: &str = "awaiting_otp";

    pub const PENDING_AMOUNT: &str = "pending_transfer_amount";
    pub const PENDING_FROM: &str = "pending_transfer_from";
    pub const PENDING_TO: &str = "pending_transfer_to";
    pub const PENDING_CURRENCY: &str = "pending_transfer_currency";
    pub const PENDING_SUBJECT: &str = "pending_transfer_subject";
    pub const PENDING_STAGED_AT: &str = "pending_transfer_staged_at";

    /// Every slot that makes up a staged transfer.
    pub const PENDING_TRANSFER: [&str; 6] = [
        PENDING_AMOUNT,
        PENDING_FROM,
        PENDING_TO,
        PENDING_CURRENCY,
        PENDING_SUBJECT,
        PENDING_STAGED_AT,
    ];
}

/// One slot assignment emitted by a turn. A `null` value clears the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotOp {
    pub name: String,
    pub value: Value,
}

impl SlotOp {
    pub fn set(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn clear(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.value.is_null()
    }
}
