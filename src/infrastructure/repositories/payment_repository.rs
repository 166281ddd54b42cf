use super::store::{Namespace, Store};
use crate::domain::payment::PaymentRecord;
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

/// Append-only payment history, stored as one JSON array per user
pub struct PaymentRepository {
    store: Arc<dyn Store>,
}

impl PaymentRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// List all payment records for a user, oldest first
    ///
    /// Unreadable history reads as empty.
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentRecord>> {
        match self.read_history(user_id).await? {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Ignoring unreadable payment history"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Append a record to the user's history
    ///
    /// Refuses to write when the stored history cannot be decoded, so existing
    /// receipts are never replaced.
    pub async fn append(&self, record: &PaymentRecord) -> AppResult<()> {
        let mut records = match self.read_history(record.user_id).await? {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    user_id = %record.user_id,
                    payment_id = %record.id,
                    error = %e,
                    "Refusing to overwrite unreadable payment history"
                );
                return Err(AppError::Internal(format!(
                    "Stored payment history is unreadable: {}",
                    e
                )));
            }
        };
        records.push(record.clone());

        let raw = serde_json::to_string(&records)
            .map_err(|e| AppError::Internal(format!("Failed to encode payment history: {}", e)))?;
        self.store.set(Namespace::Payments, record.user_id, raw).await
    }

    /// Outer error is the store, inner one the decoding of what it holds
    async fn read_history(
        &self,
        user_id: Uuid,
    ) -> AppResult<Result<Vec<PaymentRecord>, serde_json::Error>> {
        Ok(match self.store.get(Namespace::Payments, user_id).await? {
            Some(raw) => serde_json::from_str::<Vec<PaymentRecord>>(&raw),
            None => Ok(Vec::new()),
        })
    }
}
