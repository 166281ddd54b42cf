use super::error::PaymentServiceError;
use super::model::{PaymentMethod, PaymentRecord, PaymentStatus};
use super::plan::find_plan;
use crate::domain::usage::UsageTracker;
use crate::infrastructure::repositories::PaymentRepository;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Source of the random number that decides a simulated transaction
pub trait PaymentDraw: Send + Sync {
    /// Uniform value in `[0, 1)`
    fn draw(&self) -> f64;
}

pub struct ThreadRngDraw;

impl PaymentDraw for ThreadRngDraw {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Stand-in for a payment gateway.
///
/// Transactions settle after a fixed delay and succeed when the draw falls
/// under `success_rate`. There is no idempotency, confirmation or refund.
pub struct PaymentService {
    payment_repo: Arc<PaymentRepository>,
    usage_tracker: Arc<UsageTracker>,
    draw: Arc<dyn PaymentDraw>,
    delay: Duration,
    success_rate: f64,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<PaymentRepository>,
        usage_tracker: Arc<UsageTracker>,
        draw: Arc<dyn PaymentDraw>,
        delay: Duration,
        success_rate: f64,
    ) -> Self {
        Self {
            payment_repo,
            usage_tracker,
            draw,
            delay,
            success_rate,
        }
    }
}

#[async_trait]
pub trait PaymentServiceApi: Send + Sync {
    /// Buy a plan for a user
    ///
    /// On success a receipt is appended and the plan's calls are credited.
    /// A declined payment persists nothing, and a receipt that cannot be
    /// written means no calls are credited.
    async fn purchase(
        &self,
        user_id: Uuid,
        plan_id: &str,
        method: PaymentMethod,
    ) -> Result<PaymentRecord, PaymentServiceError>;

    /// Receipts for a user, oldest first
    async fn history(&self, user_id: Uuid) -> Result<Vec<PaymentRecord>, PaymentServiceError>;
}

#[async_trait]
impl PaymentServiceApi for PaymentService {
    async fn purchase(
        &self,
        user_id: Uuid,
        plan_id: &str,
        method: PaymentMethod,
    ) -> Result<PaymentRecord, PaymentServiceError> {
        let plan = find_plan(plan_id)
            .ok_or_else(|| PaymentServiceError::UnknownPlan(plan_id.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            plan_id = %plan.id,
            amount = %plan.price,
            method = %method,
            "Processing simulated payment"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let draw = self.draw.draw();
        if draw >= self.success_rate {
            tracing::warn!(
                user_id = %user_id,
                plan_id = %plan.id,
                method = %method,
                "Simulated payment declined"
            );
            return Err(PaymentServiceError::Declined);
        }

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id.clone(),
            amount: plan.price,
            method,
            timestamp: Utc::now().timestamp_millis(),
            status: PaymentStatus::Completed,
            calls: plan.calls,
        };

        // No credit without a receipt.
        self.payment_repo.append(&record).await?;

        if let Err(e) = self.usage_tracker.add_calls(user_id, plan.calls).await {
            tracing::error!(
                user_id = %user_id,
                payment_id = %record.id,
                calls = record.calls,
                error = %e,
                "Payment recorded but calls were not credited"
            );
            return Err(e.into());
        }

        tracing::info!(
            user_id = %user_id,
            payment_id = %record.id,
            calls = record.calls,
            "Simulated payment completed"
        );

        Ok(record)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<PaymentRecord>, PaymentServiceError> {
        Ok(self.payment_repo.list_by_user(user_id).await?)
    }
}
