use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::payment::{
        pricing_plans, PaymentMethod, PaymentRecord, PaymentService, PaymentServiceApi,
        PricingPlan,
    },
    error::AppResult,
    infrastructure::auth::AuthUser,
};

/// Request for POST /api/payments
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub plan_id: String,
    pub method: PaymentMethod,
}

pub struct PaymentController {
    payment_service: Arc<PaymentService>,
}

impl PaymentController {
    pub fn new(payment_service: Arc<PaymentService>) -> Self {
        Self { payment_service }
    }

    /// GET /api/plans
    pub async fn list_plans() -> Json<Vec<PricingPlan>> {
        Json(pricing_plans())
    }

    /// POST /api/payments - Buy a plan through the simulated gateway
    pub async fn create_payment(
        State(controller): State<Arc<PaymentController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<CreatePaymentRequest>,
    ) -> AppResult<(StatusCode, Json<PaymentRecord>)> {
        let record = controller
            .payment_service
            .purchase(auth_user.user_id, &request.plan_id, request.method)
            .await?;
        Ok((StatusCode::CREATED, Json(record)))
    }

    /// GET /api/payments - Receipts of the current user
    pub async fn list_payments(
        State(controller): State<Arc<PaymentController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<PaymentRecord>>> {
        let records = controller.payment_service.history(auth_user.user_id).await?;
        Ok(Json(records))
    }
}
