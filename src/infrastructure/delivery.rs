use crate::domain::ports::ChallengeDeliveryChannel;
use crate::error::SideEffectError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A code handed to the SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub subject_id: String,
    pub code: String,
}

/// Mock SMS gateway: records what it would have sent.
#[derive(Debug, Default, Clone)]
pub struct SmsOutbox {
    sent: Arc<Mutex<Vec<Delivery>>>,
    unreachable: bool,
}

impl SmsOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery fails.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.sent.lock().await.clone()
    }

    pub async fn last_code_for(&self, subject_id: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|d| d.subject_id == subject_id)
            .map(|d| d.code.clone())
    }
}

#[async_trait]
impl ChallengeDeliveryChannel for SmsOutbox {
    async fn deliver(&self, subject_id: &str, code: &str) -> Result<(), SideEffectError> {
        if self.unreachable {
            return Err(SideEffectError::Delivery("SMS gateway unreachable".into()));
        }
        self.sent.lock().await.push(Delivery {
            subject_id: subject_id.to_string(),
            code: code.to_string(),
        });
        info!(subject = subject_id, "One-time code sent by SMS");
        Ok(())
    }
}
