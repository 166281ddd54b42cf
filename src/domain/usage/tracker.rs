use super::model::UsageInfo;
use crate::domain::settings::DEMO_SENTINEL_KEY;
use crate::error::AppResult;
use crate::infrastructure::repositories::{SettingsRepository, UsageRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Client quota bookkeeping: free calls, purchased top-ups and custom-key detection.
///
/// Updates are plain read-modify-write sequences on the store. Two concurrent
/// increments for the same user can both read the same count and one of them
/// is lost; the quota is advisory so this is tolerated.
pub struct UsageTracker {
    settings_repo: Arc<SettingsRepository>,
    usage_repo: Arc<UsageRepository>,
    max_free_usage: u32,
}

impl UsageTracker {
    pub fn new(
        settings_repo: Arc<SettingsRepository>,
        usage_repo: Arc<UsageRepository>,
        max_free_usage: u32,
    ) -> Self {
        Self {
            settings_repo,
            usage_repo,
            max_free_usage,
        }
    }

    /// True for keys that mean "nothing configured": empty, blank or the sentinel
    pub fn is_default_api_key(api_key: &str) -> bool {
        api_key.trim().is_empty() || api_key == DEMO_SENTINEL_KEY
    }

    pub fn max_free_usage(&self) -> u32 {
        self.max_free_usage
    }

    pub async fn get_usage_info(&self, user_id: Uuid) -> AppResult<UsageInfo> {
        let counters = self.usage_repo.get_counters(user_id).await?;
        let has_custom_key = self
            .settings_repo
            .find_by_user(user_id)
            .await?
            .map(|settings| !Self::is_default_api_key(&settings.api_key))
            .unwrap_or(false);

        Ok(UsageInfo::new(
            counters.free_calls_consumed,
            self.max_free_usage,
            has_custom_key,
            counters.purchased_calls_total,
        ))
    }

    pub async fn can_use_service(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.get_usage_info(user_id).await?.can_use_service())
    }

    /// Record one successful metered call
    pub async fn increment_usage(&self, user_id: Uuid) -> AppResult<()> {
        let current = self.get_usage_info(user_id).await?.count;
        let next = current.saturating_add(1);
        self.usage_repo.set_free_calls_consumed(user_id, next).await?;

        tracing::info!(user_id = %user_id, count = next, "Usage incremented");
        Ok(())
    }

    /// Remaining metered calls, `-1` when a custom key is set
    pub async fn get_remaining_usage(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get_usage_info(user_id).await?.remaining())
    }

    /// Credit purchased calls
    pub async fn add_calls(&self, user_id: Uuid, calls: u32) -> AppResult<()> {
        let current = self.get_usage_info(user_id).await?.purchased_calls;
        let next = current.saturating_add(calls);
        self.usage_repo.set_purchased_calls(user_id, next).await?;

        tracing::info!(
            user_id = %user_id,
            added = calls,
            purchased_calls = next,
            "Purchased calls credited"
        );
        Ok(())
    }

    pub async fn get_purchased_calls(&self, user_id: Uuid) -> AppResult<u32> {
        Ok(self.get_usage_info(user_id).await?.purchased_calls)
    }

    pub async fn is_demo_mode(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.get_usage_info(user_id).await?.is_demo_mode())
    }

    pub async fn needs_payment(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.get_usage_info(user_id).await?.needs_payment())
    }
}
