use super::vision_repository::VisionRepository;
use crate::domain::analysis::{AnalysisError, RetryPolicy};
use crate::domain::settings::KeyProbeOutcome;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Low temperature keeps the structured reply stable
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 1000;
/// Longest slice of an error body kept in logs
const MAX_LOGGED_BODY: usize = 500;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for the Ark (Doubao) vision endpoint
pub struct ArkVisionRepository {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    retry_policy: RetryPolicy,
}

impl ArkVisionRepository {
    pub fn new(
        endpoint: String,
        model: String,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model,
            retry_policy,
        })
    }

    /// POST a JSON body, retrying timeouts, network failures, 429 and 5xx
    async fn send_with_retry<T: Serialize + ?Sized>(
        &self,
        api_key: &str,
        body: &T,
    ) -> Result<reqwest::Response, AnalysisError> {
        let mut retry = 0u32;

        loop {
            let outcome = self
                .client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .header(ACCEPT, "application/json")
                .json(body)
                .send()
                .await;

            let failure = match outcome {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(
                        status = status,
                        attempt = retry + 1,
                        body = &body[..floor_char_boundary(&body, MAX_LOGGED_BODY)],
                        "Vision API returned an error status"
                    );
                    let err = AnalysisError::Upstream { status, body };
                    if !RetryPolicy::is_retryable_status(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!(attempt = retry + 1, "Vision API request timed out");
                    AnalysisError::Timeout
                }
                Err(e) => {
                    tracing::warn!(attempt = retry + 1, error = %e, "Vision API request failed");
                    AnalysisError::Network(e.to_string())
                }
            };

            retry += 1;
            match self.retry_policy.delay_for(retry) {
                Some(delay) => {
                    tracing::info!(
                        retry = retry,
                        max_retries = self.retry_policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying vision API request"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(failure),
            }
        }
    }
}

#[async_trait]
impl VisionRepository for ArkVisionRepository {
    async fn complete(
        &self,
        api_key: &str,
        image_data_url: &str,
        prompt: &str,
    ) -> Result<String, AnalysisError> {
        let start_time = Instant::now();

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url,
                            detail: "low",
                        },
                    },
                    ContentPart::Text { text: prompt },
                ],
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        tracing::info!(
            model = %self.model,
            image_size = image_data_url.len(),
            "Calling vision API"
        );

        let response = self.send_with_retry(api_key, &request).await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout
            } else {
                AnalysisError::MalformedResponse(format!("invalid completion body: {}", e))
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("completion has no message content".to_string())
            })?;

        tracing::info!(
            provider = "ark",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis() as u64,
            content_length = content.len(),
            "Vision API call completed"
        );

        Ok(content)
    }

    async fn probe_key(&self, api_key: &str) -> Result<KeyProbeOutcome, AnalysisError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": "test" }],
            "max_tokens": 1
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::Network(e.to_string())
                }
            })?;

        let outcome = KeyProbeOutcome::from_status(response.status().as_u16());
        tracing::info!(status = response.status().as_u16(), outcome = ?outcome, "API key probed");
        Ok(outcome)
    }
}

/// Largest index <= `max` that falls on a char boundary of `s`
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
