use super::store::{Namespace, Store};
use crate::error::AppResult;
use std::sync::Arc;
use uuid::Uuid;

/// Raw counters persisted for a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCounters {
    pub free_calls_consumed: u32,
    pub purchased_calls_total: u32,
}

pub struct UsageRepository {
    store: Arc<dyn Store>,
}

impl UsageRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get both counters for a user; missing or unreadable values count as zero
    pub async fn get_counters(&self, user_id: Uuid) -> AppResult<UsageCounters> {
        let free_calls_consumed = self.read_counter(Namespace::Usage, user_id).await?;
        let purchased_calls_total = self.read_counter(Namespace::PurchasedCalls, user_id).await?;

        Ok(UsageCounters {
            free_calls_consumed,
            purchased_calls_total,
        })
    }

    pub async fn set_free_calls_consumed(&self, user_id: Uuid, count: u32) -> AppResult<()> {
        self.store
            .set(Namespace::Usage, user_id, count.to_string())
            .await
    }

    pub async fn set_purchased_calls(&self, user_id: Uuid, calls: u32) -> AppResult<()> {
        self.store
            .set(Namespace::PurchasedCalls, user_id, calls.to_string())
            .await
    }

    async fn read_counter(&self, namespace: Namespace, user_id: Uuid) -> AppResult<u32> {
        let raw = self.store.get(namespace, user_id).await?;
        Ok(raw.as_deref().map(parse_counter).unwrap_or(0))
    }
}

/// Parse a stored counter. Anything that is not a non-negative integer reads as zero.
fn parse_counter(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(raw = raw, "Ignoring unreadable usage counter");
            0
        }
    }
}
