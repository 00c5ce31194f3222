use crate::domain::ports::SlotStore;
use crate::domain::slots::SlotOp;
use crate::error::Result;
use serde_json::Value;

/// A turn's view of the session slots.
///
/// Reads see this turn's own writes first, then the store. Writes are staged
/// in order and only reach the store when the assistant commits the turn,
/// so a failed action can drop what it staged with [`SessionSlots::rollback`].
pub struct SessionSlots<'a> {
    store: &'a dyn SlotStore,
    staged: Vec<SlotOp>,
}

impl<'a> SessionSlots<'a> {
    pub fn new(store: &'a dyn SlotStore) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    /// Current value; `None` for absent or cleared slots.
    pub async fn get(&self, name: &str) -> Result<Option<Value>> {
        let value = match self.staged.iter().rev().find(|op| op.name == name) {
            Some(op) => Some(op.value.clone()),
            None => self.store.get_slot(name).await?,
        };
        Ok(value.filter(|v| !v.is_null()))
    }

    /// Non-empty string value. Numbers are rendered as text.
    pub async fn get_str(&self, name: &str) -> Result<Option<String>> {
        Ok(match self.get(name).await? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Truthiness the way the dialogue engine stores booleans.
    pub async fn get_flag(&self, name: &str) -> Result<bool> {
        Ok(match self.get(name).await? {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.staged.push(SlotOp::set(name, value));
    }

    pub fn clear(&mut self, name: &str) {
        self.staged.push(SlotOp::clear(name));
    }

    pub fn apply(&mut self, ops: impl IntoIterator<Item = SlotOp>) {
        self.staged.extend(ops);
    }

    pub fn checkpoint(&self) -> usize {
        self.staged.len()
    }

    /// Drops every write staged after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        self.staged.truncate(checkpoint);
    }

    pub fn staged(&self) -> &[SlotOp] {
        &self.staged
    }

    pub fn into_ops(self) -> Vec<SlotOp> {
        self.staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemorySlotStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_reads_prefer_staged_writes() {
        let store = InMemorySlotStore::new();
        store.set_slot("amount", json!("100")).await.unwrap();

        let mut slots = SessionSlots::new(&store);
        assert_eq!(slots.get("amount").await.unwrap(), Some(json!("100")));

        slots.set("amount", "250");
        assert_eq!(slots.get_str("amount").await.unwrap(), Some("250".to_string()));

        slots.clear("amount");
        assert_eq!(slots.get("amount").await.unwrap(), None);

        // Nothing reaches the store until the turn commits.
        assert_eq!(store.get_slot("amount").await.unwrap(), Some(json!("100")));
    }

    #[tokio::test]
    async fn test_rollback_drops_later_writes() {
        let store = InMemorySlotStore::new();
        let mut slots = SessionSlots::new(&store);
        slots.set("otp_verified", true);
        let checkpoint = slots.checkpoint();
        slots.set("last_tx_id", "TX1");
        slots.set("otp_verified", false);
        slots.rollback(checkpoint);

        assert!(slots.get_flag("otp_verified").await.unwrap());
        assert_eq!(slots.get("last_tx_id").await.unwrap(), None);
        assert_eq!(slots.into_ops(), vec![SlotOp::set("otp_verified", true)]);
    }

    #[tokio::test]
    async fn test_flag_and_string_coercion() {
        let store = InMemorySlotStore::new();
        store.set_slot("awaiting_otp", json!("True")).await.unwrap();
        store.set_slot("account_id", json!(12345)).await.unwrap();
        store.set_slot("to_account", json!("   ")).await.unwrap();

        let slots = SessionSlots::new(&store);
        assert!(slots.get_flag("awaiting_otp").await.unwrap());
        assert!(!slots.get_flag("otp_verified").await.unwrap());
        assert_eq!(slots.get_str("account_id").await.unwrap(), Some("12345".to_string()));
        assert_eq!(slots.get_str("to_account").await.unwrap(), None);
    }
}
