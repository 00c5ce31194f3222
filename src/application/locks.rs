use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

const DEFAULT_SHARDS: usize = 64;

/// Serializes work per key using a fixed set of async mutexes.
///
/// Keys hash onto shards, so unrelated keys occasionally wait on each other
/// but memory stays constant no matter how many subjects are active.
#[derive(Debug)]
pub struct SubjectLocks {
    shards: Vec<Mutex<()>>,
}

impl Default for SubjectLocks {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shards(count: usize) -> Self {
        Self {
            shards: (0..count.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.shards[self.shard_for(key)].lock().await
    }
}
