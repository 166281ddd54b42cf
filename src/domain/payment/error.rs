use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PaymentServiceError {
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error("payment failed")]
    Declined,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<AppError> for PaymentServiceError {
    fn from(err: AppError) -> Self {
        PaymentServiceError::Dependency(err.to_string())
    }
}

impl From<PaymentServiceError> for AppError {
    fn from(err: PaymentServiceError) -> Self {
        match err {
            PaymentServiceError::UnknownPlan(_) => AppError::BadRequest(err.to_string()),
            PaymentServiceError::Declined => {
                AppError::PaymentRequired("Payment failed, please try again".to_string())
            }
            PaymentServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
