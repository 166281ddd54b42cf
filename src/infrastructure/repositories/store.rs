use crate::error::AppResult;
use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Record families kept per user. Each one lives under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    UserSettings,
    Usage,
    PurchasedCalls,
    Payments,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::UserSettings => "userSettings",
            Namespace::Usage => "usage",
            Namespace::PurchasedCalls => "purchased_calls",
            Namespace::Payments => "payments",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the `<namespace>_<userId>` key under which a record is persisted
pub fn storage_key(namespace: Namespace, user_id: Uuid) -> String {
    format!("{}_{}", namespace, user_id)
}

/// Durable per-user key-value storage.
///
/// Values are opaque text (JSON or plain integers). Writes replace the whole
/// value; there is no compare-and-swap, so concurrent read-modify-write
/// sequences on the same key resolve as last write wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the raw value stored for a user, if any
    async fn get(&self, namespace: Namespace, user_id: Uuid) -> AppResult<Option<String>>;

    /// Overwrite the value stored for a user
    async fn set(&self, namespace: Namespace, user_id: Uuid, value: String) -> AppResult<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}
