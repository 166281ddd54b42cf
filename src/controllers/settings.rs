use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::settings::{mask_api_key, KeyProbeOutcome, Language, SettingsService, UserSettings},
    domain::usage::UsageTracker,
    error::AppResult,
    infrastructure::auth::AuthUser,
};

/// Settings as shown to the client. The key itself is never echoed back.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub api_key_display: String,
    pub has_custom_key: bool,
    pub notifications: bool,
    pub language: Language,
}

impl From<&UserSettings> for SettingsResponse {
    fn from(settings: &UserSettings) -> Self {
        Self {
            api_key_display: mask_api_key(&settings.api_key),
            has_custom_key: !UsageTracker::is_default_api_key(&settings.api_key),
            notifications: settings.notifications,
            language: settings.language,
        }
    }
}

/// Request for POST /api/settings/test-key
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestKeyResponse {
    #[serde(flatten)]
    pub outcome: KeyProbeOutcome,
    pub message: String,
}

pub struct SettingsController {
    settings_service: Arc<SettingsService>,
}

impl SettingsController {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        Self { settings_service }
    }

    /// GET /api/settings - Current settings with the key masked
    pub async fn get_settings(
        State(controller): State<Arc<SettingsController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<SettingsResponse>> {
        let settings = controller
            .settings_service
            .get_settings(auth_user.user_id)
            .await?;
        Ok(Json(SettingsResponse::from(&settings)))
    }

    /// PUT /api/settings - Replace the whole settings record
    pub async fn update_settings(
        State(controller): State<Arc<SettingsController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<UserSettings>,
    ) -> AppResult<Json<SettingsResponse>> {
        let saved = controller
            .settings_service
            .save_settings(auth_user.user_id, request)
            .await?;
        Ok(Json(SettingsResponse::from(&saved)))
    }

    /// POST /api/settings/test-key - Probe a key against the vision provider
    pub async fn test_key(
        State(controller): State<Arc<SettingsController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<TestKeyRequest>,
    ) -> AppResult<Json<TestKeyResponse>> {
        let outcome = controller
            .settings_service
            .test_api_key(auth_user.user_id, request.api_key)
            .await?;

        tracing::info!(user_id = %auth_user.user_id, outcome = ?outcome, "API key test completed");

        Ok(Json(TestKeyResponse {
            message: outcome.message(),
            outcome,
        }))
    }
}
