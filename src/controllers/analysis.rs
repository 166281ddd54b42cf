use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::{
        analysis::{AnalysisRequest, AnalysisResult, AnalysisService, AnalysisServiceApi, KeySource},
        settings::{Language, SettingsService},
        usage::{UsageTracker, UNLIMITED_REMAINING},
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub const X_USAGE_REMAINING: &str = "x-usage-remaining";
pub const X_KEY_SOURCE: &str = "x-key-source";

/// Request for POST /api/analyze
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Photo as a `data:image/...;base64,` URL
    pub image_data: String,
    /// Reply language; the saved settings language when absent
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub custom_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub key_source: KeySource,
    /// `-1` when the user's own key was used
    pub remaining_calls: i64,
}

pub struct AnalysisController {
    analysis_service: Arc<AnalysisService>,
    settings_service: Arc<SettingsService>,
    usage_tracker: Arc<UsageTracker>,
}

impl AnalysisController {
    pub fn new(
        analysis_service: Arc<AnalysisService>,
        settings_service: Arc<SettingsService>,
        usage_tracker: Arc<UsageTracker>,
    ) -> Self {
        Self {
            analysis_service,
            settings_service,
            usage_tracker,
        }
    }

    /// POST /api/analyze - Check a homework photo
    pub async fn analyze(
        State(controller): State<Arc<AnalysisController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<AnalyzeRequest>,
    ) -> AppResult<(HeaderMap, Json<AnalyzeResponse>)> {
        if request.image_data.trim().is_empty() {
            return Err(AppError::BadRequest("Image data cannot be empty".to_string()));
        }

        let user_language = match request.language {
            Some(language) => language,
            None => {
                controller
                    .settings_service
                    .get_settings(auth_user.user_id)
                    .await?
                    .language
            }
        };

        let outcome = controller
            .analysis_service
            .analyze_homework(AnalysisRequest {
                image_data: request.image_data,
                user_language,
                user_id: Some(auth_user.user_id),
                custom_api_key: request.custom_api_key,
            })
            .await?;

        // Only successful calls on the operator key are metered
        if outcome.key_source.is_metered() {
            if let Err(e) = controller.usage_tracker.increment_usage(auth_user.user_id).await {
                tracing::error!(
                    user_id = %auth_user.user_id,
                    error = %e,
                    "Failed to record metered call"
                );
            }
        }

        let remaining_calls = if outcome.key_source.is_metered() {
            controller
                .usage_tracker
                .get_remaining_usage(auth_user.user_id)
                .await?
        } else {
            UNLIMITED_REMAINING
        };

        let mut headers = HeaderMap::new();
        headers.insert(X_USAGE_REMAINING, HeaderValue::from(remaining_calls));
        headers.insert(
            X_KEY_SOURCE,
            HeaderValue::from_static(outcome.key_source.as_str()),
        );

        Ok((
            headers,
            Json(AnalyzeResponse {
                result: outcome.result,
                key_source: outcome.key_source,
                remaining_calls,
            }),
        ))
    }
}
