use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::{shared::usage_dto::UsageResponse, usage::UsageTracker},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct UsageController {
    usage_tracker: Arc<UsageTracker>,
}

impl UsageController {
    pub fn new(usage_tracker: Arc<UsageTracker>) -> Self {
        Self { usage_tracker }
    }

    /// GET /api/usage - Quota summary for the current user
    pub async fn get_usage(
        State(controller): State<Arc<UsageController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<UsageResponse>> {
        let usage = controller
            .usage_tracker
            .get_usage_info(auth_user.user_id)
            .await?;
        Ok(Json(UsageResponse::from(usage)))
    }
}
