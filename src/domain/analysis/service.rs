use super::error::AnalysisError;
use super::compression::ImageCompressor;
use super::key_resolution::{resolve_api_key, KeyCandidates, KeySource};
use super::model::{AnalysisRequest, AnalysisResult};
use super::parser::parse_analysis_content;
use super::prompt::build_analysis_prompt;
use crate::domain::usage::UsageTracker;
use crate::infrastructure::repositories::{SettingsRepository, VisionRepository};
use async_trait::async_trait;
use std::sync::Arc;

/// Successful analysis together with the key that paid for it
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub key_source: KeySource,
}

pub struct AnalysisService {
    settings_repo: Arc<SettingsRepository>,
    usage_tracker: Arc<UsageTracker>,
    vision_repo: Arc<dyn VisionRepository>,
    compressor: ImageCompressor,
    demo_api_key: Option<String>,
}

impl AnalysisService {
    pub fn new(
        settings_repo: Arc<SettingsRepository>,
        usage_tracker: Arc<UsageTracker>,
        vision_repo: Arc<dyn VisionRepository>,
        compressor: ImageCompressor,
        demo_api_key: Option<String>,
    ) -> Self {
        Self {
            settings_repo,
            usage_tracker,
            vision_repo,
            compressor,
            demo_api_key,
        }
    }
}

#[async_trait]
pub trait AnalysisServiceApi: Send + Sync {
    /// Analyze a homework photo.
    ///
    /// This operation:
    /// - Resolves the API key (explicit, saved, then demo if budget remains)
    /// - Compresses large images
    /// - Calls the vision model with retries
    /// - Parses the reply
    ///
    /// Nothing is persisted. Callers meter the call when the returned key
    /// source is [`KeySource::Demo`].
    async fn analyze_homework(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError>;
}

#[async_trait]
impl AnalysisServiceApi for AnalysisService {
    async fn analyze_homework(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        tracing::info!(
            user_id = ?request.user_id,
            language = %request.user_language,
            image_size = request.image_data.len(),
            "Homework analysis request"
        );

        // 1. Load what the user has saved
        let saved_key = match request.user_id {
            Some(user_id) => self
                .settings_repo
                .find_by_user(user_id)
                .await?
                .map(|settings| settings.api_key),
            None => None,
        };

        // 2. Check the metered budget; anonymous calls cannot be metered
        let demo_budget_available = match request.user_id {
            Some(user_id) => !self.usage_tracker.needs_payment(user_id).await?,
            None => false,
        };

        // 3. Pick the key
        let resolved = resolve_api_key(KeyCandidates {
            explicit: request.custom_api_key.as_deref(),
            saved: saved_key.as_deref(),
            demo: self.demo_api_key.as_deref(),
            demo_budget_available,
        })?;

        tracing::info!(
            user_id = ?request.user_id,
            key_source = %resolved.source,
            "API key resolved"
        );

        // 4. Shrink the image off the async runtime
        let compressor = self.compressor;
        let image_data = request.image_data;
        let compressed = tokio::task::spawn_blocking(move || compressor.compress(&image_data))
            .await
            .map_err(|e| AnalysisError::Dependency(format!("image task failed: {}", e)))??;

        // 5. Ask the model
        let prompt = build_analysis_prompt(request.user_language);
        let content = self
            .vision_repo
            .complete(&resolved.key, &compressed, &prompt)
            .await?;

        // 6. Parse the reply
        let result = parse_analysis_content(&content)?;

        tracing::info!(
            user_id = ?request.user_id,
            key_source = %resolved.source,
            total_char_count = result.total_char_count,
            error_count = result.errors.len(),
            "Homework analysis completed"
        );

        Ok(AnalysisOutcome {
            result,
            key_source: resolved.source,
        })
    }
}
