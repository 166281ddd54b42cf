use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored in place of a real key when the user has none
pub const DEMO_SENTINEL_KEY: &str = "demo_key_***";

/// Shown instead of any key that must not be echoed back
pub const MASKED_KEY_DISPLAY: &str = "***";

/// Interface language, also used as the language of model replies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::ZhCn => "zh-CN",
            Language::EnUs => "en-US",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Settings record persisted per user. Saved wholesale, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_notifications() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            notifications: true,
            language: Language::ZhCn,
        }
    }
}

/// Mask a key for display: only the first four characters survive
pub fn mask_api_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == DEMO_SENTINEL_KEY {
        return MASKED_KEY_DISPLAY.to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    format!("{}{}", prefix, MASKED_KEY_DISPLAY)
}

/// Outcome of a minimal request made with a candidate key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyProbeOutcome {
    Valid,
    Invalid,
    QuotaExceeded,
    Unexpected { http_status: u16 },
}

impl KeyProbeOutcome {
    /// Classify the HTTP status returned for a probe request
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => KeyProbeOutcome::Invalid,
            429 => KeyProbeOutcome::QuotaExceeded,
            // A 400 means the key was accepted and only the tiny request was rejected
            200..=299 | 400 => KeyProbeOutcome::Valid,
            other => KeyProbeOutcome::Unexpected { http_status: other },
        }
    }

    pub fn message(&self) -> String {
        match self {
            KeyProbeOutcome::Valid => "API key is valid".to_string(),
            KeyProbeOutcome::Invalid => "API key was rejected".to_string(),
            KeyProbeOutcome::QuotaExceeded => "API key quota exceeded".to_string(),
            KeyProbeOutcome::Unexpected { http_status } => {
                format!("Unexpected response from API: {}", http_status)
            }
        }
    }
}
