use super::error::AnalysisError;
use crate::domain::usage::UsageTracker;
use serde::Serialize;
use std::fmt;

/// Values left in configuration by setup templates instead of a real key
const PLACEHOLDER_KEYS: &[&str] = &["your_ark_api_key_here", "YOUR_REAL_API_KEY_HERE"];

/// Where the key used for a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Passed with the request
    Explicit,
    /// Stored in the user's settings
    Saved,
    /// Operator key, metered against the user's quota
    Demo,
}

impl KeySource {
    /// Only calls made with the operator key count against the quota
    pub fn is_metered(&self) -> bool {
        matches!(self, KeySource::Demo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Explicit => "explicit",
            KeySource::Saved => "saved",
            KeySource::Demo => "demo",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: KeySource,
}

impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("key", &"***")
            .field("source", &self.source)
            .finish()
    }
}

/// Keys available for one request
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyCandidates<'a> {
    pub explicit: Option<&'a str>,
    pub saved: Option<&'a str>,
    pub demo: Option<&'a str>,
    /// Whether the user may still spend metered calls on the demo key
    pub demo_budget_available: bool,
}

pub fn is_placeholder_key(key: &str) -> bool {
    PLACEHOLDER_KEYS.contains(&key.trim())
}

/// Pick the key for a request: explicit, then saved, then the operator demo key.
pub fn resolve_api_key(candidates: KeyCandidates<'_>) -> Result<ResolvedKey, AnalysisError> {
    let user_key = candidates
        .explicit
        .filter(|key| !UsageTracker::is_default_api_key(key))
        .map(|key| (key, KeySource::Explicit))
        .or_else(|| {
            candidates
                .saved
                .filter(|key| !UsageTracker::is_default_api_key(key))
                .map(|key| (key, KeySource::Saved))
        });

    let (key, source) = match user_key {
        Some(found) => found,
        None => {
            if !candidates.demo_budget_available {
                return Err(AnalysisError::QuotaExceeded);
            }
            match candidates.demo.filter(|key| !key.trim().is_empty()) {
                Some(key) => (key, KeySource::Demo),
                None => {
                    return Err(AnalysisError::NotConfigured(
                        "set your API key in settings or contact the administrator".to_string(),
                    ))
                }
            }
        }
    };

    if is_placeholder_key(key) {
        return Err(AnalysisError::NotConfigured(format!(
            "the {} API key is still the setup placeholder",
            source
        )));
    }

    Ok(ResolvedKey {
        key: key.trim().to_string(),
        source,
    })
}
