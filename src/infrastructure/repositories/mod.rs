pub mod ark_vision_repository;
pub mod memory_store;
pub mod payment_repository;
pub mod postgres_store;
pub mod settings_repository;
pub mod store;
pub mod usage_repository;
pub mod vision_repository;

pub use ark_vision_repository::ArkVisionRepository;
pub use memory_store::InMemoryStore;
pub use payment_repository::PaymentRepository;
pub use postgres_store::PostgresStore;
pub use settings_repository::SettingsRepository;
pub use store::{storage_key, Namespace, Store};
pub use usage_repository::{UsageCounters, UsageRepository};
pub use vision_repository::VisionRepository;
