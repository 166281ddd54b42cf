pub mod analysis;
pub mod health;
pub mod payment;
pub mod settings;
pub mod usage;
