use crate::error::AppError;

/// Failures of the analysis path.
///
/// Only `Timeout`, `Network` and retryable `Upstream` statuses are retried;
/// everything else is terminal.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no usable API key configured: {0}")]
    NotConfigured(String),
    #[error("free calls exhausted; add your own API key in settings or purchase more calls")]
    QuotaExceeded,
    #[error("request to the vision model timed out")]
    Timeout,
    #[error("{}", upstream_message(.status))]
    Upstream { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("model response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

/// User-facing category for an upstream HTTP status
fn upstream_message(status: &u16) -> String {
    match *status {
        401 => "vision model rejected the API key (401)".to_string(),
        429 => "vision model rate limit or key quota exceeded (429)".to_string(),
        500..=599 => format!("vision model is unavailable ({})", status),
        other => format!("vision model returned an error ({})", other),
    }
}

impl From<AppError> for AnalysisError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => AnalysisError::InvalidImage(msg),
            _ => AnalysisError::Dependency(err.to_string()),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NotConfigured(_) => AppError::NotConfigured(err.to_string()),
            AnalysisError::QuotaExceeded => AppError::PaymentRequired(err.to_string()),
            AnalysisError::Timeout => AppError::GatewayTimeout(err.to_string()),
            AnalysisError::Upstream { .. }
            | AnalysisError::Network(_)
            | AnalysisError::MalformedResponse(_) => AppError::ExternalService(err.to_string()),
            AnalysisError::InvalidImage(msg) => AppError::BadRequest(msg),
            AnalysisError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
