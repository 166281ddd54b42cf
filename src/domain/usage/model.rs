use serde::{Deserialize, Serialize};

/// Free calls granted to every user before payment or a custom key is needed
pub const DEFAULT_MAX_FREE_USAGE: u32 = 10;

/// Remaining-calls value reported when the user brings their own key
pub const UNLIMITED_REMAINING: i64 = -1;

/// Quota state derived from the stored counters and settings. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageInfo {
    /// Calls consumed with the operator's key
    pub count: u32,
    pub max_free_usage: u32,
    pub has_custom_key: bool,
    pub purchased_calls: u32,
    /// `max_free_usage + purchased_calls`
    pub total_available_calls: u32,
}

impl UsageInfo {
    pub fn new(count: u32, max_free_usage: u32, has_custom_key: bool, purchased_calls: u32) -> Self {
        Self {
            count,
            max_free_usage,
            has_custom_key,
            purchased_calls,
            total_available_calls: max_free_usage.saturating_add(purchased_calls),
        }
    }

    pub fn can_use_service(&self) -> bool {
        self.has_custom_key || self.count < self.total_available_calls
    }

    /// Calls left on the metered budget, or [`UNLIMITED_REMAINING`] with a custom key
    pub fn remaining(&self) -> i64 {
        if self.has_custom_key {
            return UNLIMITED_REMAINING;
        }
        (i64::from(self.total_available_calls) - i64::from(self.count)).max(0)
    }

    pub fn is_demo_mode(&self) -> bool {
        !self.has_custom_key && self.count < self.max_free_usage
    }

    pub fn needs_payment(&self) -> bool {
        !self.has_custom_key && self.count >= self.total_available_calls
    }
}
