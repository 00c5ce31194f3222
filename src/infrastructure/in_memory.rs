use crate::domain::otp::OtpChallenge;
use crate::domain::ports::{ChallengeStore, SlotStore};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local challenge storage. Challenges vanish with the process.
///
/// Clones share the same map, so a test can keep a handle to what the
/// authority writes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryChallengeStore {
    challenges: Arc<RwLock<HashMap<String, OtpChallenge>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.challenges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.challenges.read().await.is_empty()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn put(&self, challenge: OtpChallenge) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.subject_id.clone(), challenge);
        Ok(())
    }

    async fn get(&self, subject_id: &str) -> Result<Option<OtpChallenge>> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(subject_id).cloned())
    }

    async fn remove(&self, subject_id: &str) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        challenges.remove(subject_id);
        Ok(())
    }
}

/// Slot storage for one conversation, standing in for the dialogue engine's
/// tracker.
#[derive(Debug, Default, Clone)]
pub struct InMemorySlotStore {
    slots: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.slots.read().await.clone()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn get_slot(&self, name: &str) -> Result<Option<Value>> {
        let slots = self.slots.read().await;
        Ok(slots.get(name).cloned())
    }

    async fn set_slot(&self, name: &str, value: Value) -> Result<()> {
        let mut slots = self.slots.write().await;
        if value.is_null() {
            slots.remove(name);
        } else {
            slots.insert(name.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::otp::OtpPolicy;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_challenge_store_replaces_per_subject() {
        let store = InMemoryChallengeStore::new();
        let first = OtpChallenge::issue("cust_1", "111111", Utc::now(), OtpPolicy::default());
        let second = OtpChallenge::issue("cust_1", "222222", Utc::now(), OtpPolicy::default());

        store.put(first).await.unwrap();
        store.put(second.clone()).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("cust_1").await.unwrap(), Some(second));

        store.remove("cust_1").await.unwrap();
        assert!(store.get("cust_1").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_slot_store_null_clears() {
        let store = InMemorySlotStore::new();
        store.set_slot("amount", json!(6000)).await.unwrap();
        assert_eq!(store.get_slot("amount").await.unwrap(), Some(json!(6000)));

        store.set_slot("amount", Value::Null).await.unwrap();
        assert_eq!(store.get_slot("amount").await.unwrap(), None);
        assert!(store.snapshot().await.is_empty());
    }
}
