use super::banking::{
    BalanceQuery, BalanceSnapshot, BillPayment, BillReceipt, HistoryQuery, TransactionHistory,
    TransferOrder, TransferReceipt,
};
use super::otp::OtpChallenge;
use crate::error::{BackendError, Result, SideEffectError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Storage for live one-time challenges, keyed by subject id.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Inserts or replaces the subject's challenge.
    async fn put(&self, challenge: OtpChallenge) -> Result<()>;
    async fn get(&self, subject_id: &str) -> Result<Option<OtpChallenge>>;
    async fn remove(&self, subject_id: &str) -> Result<()>;
}

/// Session-scoped named values owned by the dialogue engine.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get_slot(&self, name: &str) -> Result<Option<Value>>;
    /// `Value::Null` clears the slot.
    async fn set_slot(&self, name: &str, value: Value) -> Result<()>;
}

#[async_trait]
pub trait BankingBackend: Send + Sync {
    async fn balance(&self, query: &BalanceQuery) -> std::result::Result<BalanceSnapshot, BackendError>;
    async fn transfer(&self, order: &TransferOrder) -> std::result::Result<TransferReceipt, BackendError>;
    async fn pay_bill(&self, payment: &BillPayment) -> std::result::Result<BillReceipt, BackendError>;
    async fn transactions(
        &self,
        query: &HistoryQuery,
    ) -> std::result::Result<TransactionHistory, BackendError>;
}

/// Out-of-band delivery of challenge codes (SMS, push, ...).
#[async_trait]
pub trait ChallengeDeliveryChannel: Send + Sync {
    async fn deliver(&self, subject_id: &str, code: &str) -> std::result::Result<(), SideEffectError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns a reference to the produced audio artifact.
    async fn synthesize(&self, text: &str, locale: &str) -> std::result::Result<String, SideEffectError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait CodeGenerator: Send + Sync {
    fn next_code(&self) -> String;
}

pub type ChallengeStoreBox = Box<dyn ChallengeStore>;
pub type BankingBackendBox = Box<dyn BankingBackend>;
pub type DeliveryChannelBox = Box<dyn ChallengeDeliveryChannel>;
pub type SpeechSynthesizerBox = Box<dyn SpeechSynthesizer>;
pub type ClockBox = Box<dyn Clock>;
pub type CodeGeneratorBox = Box<dyn CodeGenerator>;
