use super::store::{Namespace, Store};
use crate::domain::settings::UserSettings;
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

pub struct SettingsRepository {
    store: Arc<dyn Store>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get the saved settings for a user.
    ///
    /// A record that does not parse is treated as absent.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserSettings>> {
        let raw = match self.store.get(Namespace::UserSettings, user_id).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str::<UserSettings>(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Ignoring unreadable settings record"
                );
                Ok(None)
            }
        }
    }

    /// Replace the settings record for a user
    pub async fn save(&self, user_id: Uuid, settings: &UserSettings) -> AppResult<()> {
        let raw = serde_json::to_string(settings)
            .map_err(|e| AppError::Internal(format!("Failed to encode settings: {}", e)))?;
        self.store.set(Namespace::UserSettings, user_id, raw).await
    }
}
