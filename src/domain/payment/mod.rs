pub mod error;
pub mod model;
pub mod plan;
pub mod service;

pub use error::PaymentServiceError;
pub use model::{PaymentMethod, PaymentRecord, PaymentStatus};
pub use plan::{find_plan, pricing_plans, PricingPlan};
pub use service::{PaymentDraw, PaymentService, PaymentServiceApi, ThreadRngDraw};
