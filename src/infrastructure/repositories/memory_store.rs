use super::store::{storage_key, Namespace, Store};
use crate::error::AppResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Process-local store. Used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all namespaces
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, namespace: Namespace, user_id: Uuid) -> AppResult<Option<String>> {
        let key = storage_key(namespace, user_id);
        Ok(self.entries.read().get(&key).cloned())
    }

    async fn set(&self, namespace: Namespace, user_id: Uuid, value: String) -> AppResult<()> {
        let key = storage_key(namespace, user_id);
        self.entries.write().insert(key, value);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
