use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl From<AppError> for SettingsServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => SettingsServiceError::Invalid(msg),
            _ => SettingsServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<SettingsServiceError> for AppError {
    fn from(err: SettingsServiceError) -> Self {
        match err {
            SettingsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SettingsServiceError::Dependency(msg) => AppError::ExternalService(msg),
        }
    }
}
