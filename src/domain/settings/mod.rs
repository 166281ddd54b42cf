pub mod error;
pub mod model;
pub mod service;

pub use error::SettingsServiceError;
pub use model::{mask_api_key, KeyProbeOutcome, Language, UserSettings, DEMO_SENTINEL_KEY};
pub use service::SettingsService;
