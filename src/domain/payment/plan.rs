use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable bundle of analysis calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingPlan {
    pub id: String,
    pub calls: u32,
    pub price: Decimal,
    pub popular: bool,
}

impl PricingPlan {
    fn new(id: &str, calls: u32, price_cents: i64, popular: bool) -> Self {
        Self {
            id: id.to_string(),
            calls,
            price: Decimal::new(price_cents, 2),
            popular,
        }
    }
}

pub fn pricing_plans() -> Vec<PricingPlan> {
    vec![
        PricingPlan::new("basic", 50, 990, false),
        PricingPlan::new("standard", 200, 2990, true),
        PricingPlan::new("premium", 500, 5990, false),
    ]
}

pub fn find_plan(plan_id: &str) -> Option<PricingPlan> {
    pricing_plans().into_iter().find(|plan| plan.id == plan_id)
}
