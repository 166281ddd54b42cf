use crate::domain::usage::UsageInfo;
use serde::{Deserialize, Serialize};

/// Response for GET /api/usage
#[derive(Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    #[serde(flatten)]
    pub usage: UsageInfo,
    /// `-1` when a custom key makes usage unlimited
    pub remaining_calls: i64,
    pub demo_mode: bool,
    pub needs_payment: bool,
}

impl From<UsageInfo> for UsageResponse {
    fn from(usage: UsageInfo) -> Self {
        Self {
            remaining_calls: usage.remaining(),
            demo_mode: usage.is_demo_mode(),
            needs_payment: usage.needs_payment(),
            usage,
        }
    }
}
