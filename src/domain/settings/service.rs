use super::error::SettingsServiceError;
use super::model::{KeyProbeOutcome, UserSettings, DEMO_SENTINEL_KEY};
use crate::infrastructure::repositories::{SettingsRepository, VisionRepository};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Format of keys issued by the Ark console
fn api_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
            .expect("API key pattern is valid")
    })
}

/// Empty and sentinel keys are always accepted; anything else must look like a real key
pub fn is_valid_api_key_format(api_key: &str) -> bool {
    let trimmed = api_key.trim();
    trimmed.is_empty() || trimmed == DEMO_SENTINEL_KEY || api_key_pattern().is_match(trimmed)
}

pub struct SettingsService {
    settings_repo: Arc<SettingsRepository>,
    vision_repo: Arc<dyn VisionRepository>,
}

impl SettingsService {
    pub fn new(settings_repo: Arc<SettingsRepository>, vision_repo: Arc<dyn VisionRepository>) -> Self {
        Self {
            settings_repo,
            vision_repo,
        }
    }

    /// Get saved settings, or defaults for a user who never saved any
    pub async fn get_settings(&self, user_id: Uuid) -> Result<UserSettings, SettingsServiceError> {
        Ok(self
            .settings_repo
            .find_by_user(user_id)
            .await?
            .unwrap_or_default())
    }

    /// Replace the user's settings record
    pub async fn save_settings(
        &self,
        user_id: Uuid,
        mut settings: UserSettings,
    ) -> Result<UserSettings, SettingsServiceError> {
        if !is_valid_api_key_format(&settings.api_key) {
            return Err(SettingsServiceError::Invalid(
                "Invalid API key format, expected xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx".to_string(),
            ));
        }
        settings.api_key = settings.api_key.trim().to_string();

        self.settings_repo.save(user_id, &settings).await?;

        tracing::info!(
            user_id = %user_id,
            language = %settings.language,
            notifications = settings.notifications,
            has_api_key = !settings.api_key.is_empty(),
            "User settings saved"
        );

        Ok(settings)
    }

    /// Check a key against the provider. Uses the saved key when none is given.
    pub async fn test_api_key(
        &self,
        user_id: Uuid,
        api_key: Option<String>,
    ) -> Result<KeyProbeOutcome, SettingsServiceError> {
        let candidate = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => self.get_settings(user_id).await?.api_key,
        };

        if candidate.trim().is_empty() || candidate == DEMO_SENTINEL_KEY {
            return Err(SettingsServiceError::Invalid(
                "Please enter an API key first".to_string(),
            ));
        }

        self.vision_repo
            .probe_key(candidate.trim())
            .await
            .map_err(|e| SettingsServiceError::Dependency(e.to_string()))
    }
}
