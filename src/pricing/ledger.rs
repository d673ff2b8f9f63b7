//! Running totals for one billing period.

use std::sync::Mutex;

use rust_decimal::Decimal;

use super::PricingError;
use super::cost::{CostBreakdown, compute_cost};
use super::usage::UsageCounters;
use crate::models::Endpoint;

#[derive(Debug, Default)]
struct Totals {
    billed_tokens: u64,
    spent: Decimal,
}

/// Tracks billed tokens and spend so each call is priced at the tier the
/// period has reached.
///
/// `charge` reads the running token count, prices the call and records it
/// under one lock, so concurrent charges never observe the same level.
#[derive(Debug, Default)]
pub struct BillingLedger {
    totals: Mutex<Totals>,
    limit: Option<Decimal>,
}

impl BillingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Decimal) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Resumes a period that already billed `tokens` and `spent`.
    pub fn resume(billed_tokens: u64, spent: Decimal) -> Self {
        Self {
            totals: Mutex::new(Totals {
                billed_tokens,
                spent,
            }),
            limit: None,
        }
    }

    pub fn charge(
        &self,
        usage: &UsageCounters,
        endpoint: &Endpoint,
    ) -> Result<CostBreakdown, PricingError> {
        let mut totals = self.lock();
        let level = i64::try_from(totals.billed_tokens).unwrap_or(i64::MAX);
        let cost = compute_cost(&usage.billed_after(level), endpoint)?;
        let spent = totals
            .spent
            .checked_add(cost.total)
            .ok_or(PricingError::overflow("period spend"))?;
        totals.billed_tokens = totals.billed_tokens.saturating_add(usage.total_tokens());
        totals.spent = spent;
        Ok(cost)
    }

    pub fn billed_tokens(&self) -> u64 {
        self.lock().billed_tokens
    }

    pub fn spent(&self) -> Decimal {
        self.lock().spent
    }

    pub fn status(&self) -> SpendStatus {
        let spent = self.spent();
        match self.limit {
            None => SpendStatus::Unlimited { spent },
            Some(limit) if spent >= limit => SpendStatus::Exceeded {
                spent,
                limit,
                overage: spent.saturating_sub(limit),
            },
            Some(limit) => SpendStatus::WithinLimit {
                spent,
                limit,
                remaining: limit.saturating_sub(spent),
            },
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Totals> {
        self.totals.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpendStatus {
    Unlimited {
        spent: Decimal,
    },
    WithinLimit {
        spent: Decimal,
        limit: Decimal,
        remaining: Decimal,
    },
    Exceeded {
        spent: Decimal,
        limit: Decimal,
        overage: Decimal,
    },
}

impl SpendStatus {
    pub fn is_exceeded(&self) -> bool {
        matches!(self, Self::Exceeded { .. })
    }

    pub fn spent(&self) -> Decimal {
        match self {
            Self::Unlimited { spent } => *spent,
            Self::WithinLimit { spent, .. } => *spent,
            Self::Exceeded { spent, .. } => *spent,
        }
    }
}
