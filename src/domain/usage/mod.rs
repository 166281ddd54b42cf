pub mod model;
pub mod tracker;

pub use model::{UsageInfo, DEFAULT_MAX_FREE_USAGE, UNLIMITED_REMAINING};
pub use tracker::UsageTracker;
