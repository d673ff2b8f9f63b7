//! Tiered, multi-component cost calculation.
//!
//! All money is [`rust_decimal::Decimal`] so per-token rates as small as
//! `1e-8` sum exactly across any number of calls.

mod cost;
mod ledger;
mod tier;
mod usage;

pub use cost::{CostBreakdown, CostComponent, compute_cost, compute_cost_with_tiers};
pub use ledger::{BillingLedger, SpendStatus};
pub use tier::{CacheMultipliers, PricingTier, select_tier, validate_tiers};
pub use usage::UsageCounters;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The pricing table or usage level cannot be priced.
    #[error("Invalid pricing config: {reason}")]
    InvalidPricingConfig { reason: String },

    /// An amount left the range `Decimal` can represent.
    #[error("Cost overflow in {item}")]
    Overflow { item: &'static str },
}

impl PricingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPricingConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(item: &'static str) -> Self {
        Self::Overflow { item }
    }
}
