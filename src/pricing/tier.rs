use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PricingError;

/// Rates that apply once cumulative billed tokens reach `threshold`.
///
/// Every rate is per unit (token, image, audio unit, search call, request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    #[serde(default)]
    pub threshold: u64,
    pub input: Decimal,
    pub output: Decimal,
    /// Reasoning tokens, when billed apart from output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Decimal>,
    /// Legacy flat rate for cached prompt tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read: Option<Decimal>,
    /// Legacy flat rate for cached completion tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_multipliers: Option<CacheMultipliers>,
}

/// Factors applied to a tier's base input/output rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMultipliers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_output: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_5m: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_1h: Option<Decimal>,
}

impl PricingTier {
    pub fn flat(input: Decimal, output: Decimal) -> Self {
        Self {
            threshold: 0,
            input,
            output,
            thinking: None,
            image: None,
            audio: None,
            web_search: None,
            request: None,
            cache_read: None,
            cache_write: None,
            cache_multipliers: None,
        }
    }

    pub fn at(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_thinking(mut self, rate: Decimal) -> Self {
        self.thinking = Some(rate);
        self
    }

    pub fn with_image(mut self, rate: Decimal) -> Self {
        self.image = Some(rate);
        self
    }

    pub fn with_audio(mut self, rate: Decimal) -> Self {
        self.audio = Some(rate);
        self
    }

    pub fn with_web_search(mut self, rate: Decimal) -> Self {
        self.web_search = Some(rate);
        self
    }

    pub fn with_request(mut self, rate: Decimal) -> Self {
        self.request = Some(rate);
        self
    }

    pub fn with_cache_rates(mut self, read: Option<Decimal>, write: Option<Decimal>) -> Self {
        self.cache_read = read;
        self.cache_write = write;
        self
    }

    pub fn with_multipliers(mut self, multipliers: CacheMultipliers) -> Self {
        self.cache_multipliers = Some(multipliers);
        self
    }

    pub(crate) fn multipliers(&self) -> CacheMultipliers {
        self.cache_multipliers.unwrap_or_default()
    }
}

/// Checks the ordering rules every pricing table must follow.
pub fn validate_tiers(tiers: &[PricingTier]) -> Result<(), PricingError> {
    let first = tiers
        .first()
        .ok_or_else(|| PricingError::invalid("pricing table has no tiers"))?;
    if first.threshold != 0 {
        return Err(PricingError::invalid(format!(
            "first tier threshold must be 0, found {}",
            first.threshold
        )));
    }
    for pair in tiers.windows(2) {
        if pair[1].threshold <= pair[0].threshold {
            return Err(PricingError::invalid(format!(
                "tier thresholds must strictly increase ({} then {})",
                pair[0].threshold, pair[1].threshold
            )));
        }
    }
    Ok(())
}

/// Index and tier in effect at `cumulative_billed_tokens`.
pub fn select_tier(
    tiers: &[PricingTier],
    cumulative_billed_tokens: i64,
) -> Result<(usize, &PricingTier), PricingError> {
    validate_tiers(tiers)?;
    if cumulative_billed_tokens < 0 {
        return Err(PricingError::invalid(format!(
            "cumulative billed tokens cannot be negative ({})",
            cumulative_billed_tokens
        )));
    }

    let level = cumulative_billed_tokens as u64;
    let reached = tiers.partition_point(|tier| tier.threshold <= level);
    let index = reached.saturating_sub(1);
    Ok((index, &tiers[index]))
}
