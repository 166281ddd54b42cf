pub mod analysis;
pub mod auth;
pub mod payment;
pub mod settings;
pub mod shared;
pub mod usage;
