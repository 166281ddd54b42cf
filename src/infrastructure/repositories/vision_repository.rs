use crate::domain::analysis::AnalysisError;
use crate::domain::settings::KeyProbeOutcome;
use async_trait::async_trait;

/// Repository for vision model calls.
/// Abstracts the chat-completion provider behind the analysis service.
///
/// Implementations are responsible for:
/// - Authenticating with the given key
/// - Enforcing the request deadline
/// - Retrying rate-limited and failed requests with backoff
#[async_trait]
pub trait VisionRepository: Send + Sync {
    /// Send an image and an instruction, returning the raw text of the reply
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for the provider
    /// * `image_data_url` - Image as a `data:` URL
    /// * `prompt` - Instruction describing the expected reply
    async fn complete(
        &self,
        api_key: &str,
        image_data_url: &str,
        prompt: &str,
    ) -> Result<String, AnalysisError>;

    /// Make the smallest possible request to find out whether a key works
    async fn probe_key(&self, api_key: &str) -> Result<KeyProbeOutcome, AnalysisError>;
}
