use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PricingError;
use super::tier::{PricingTier, select_tier};
use super::usage::UsageCounters;
use crate::models::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    Input,
    Output,
    Thinking,
    CachedInput,
    CachedOutput,
    CacheWrite5m,
    CacheWrite1h,
    Image,
    Audio,
    WebSearch,
    Request,
}

impl CostComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Thinking => "thinking",
            Self::CachedInput => "cached_input",
            Self::CachedOutput => "cached_output",
            Self::CacheWrite5m => "cache_write_5m",
            Self::CacheWrite1h => "cache_write_1h",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::WebSearch => "web_search",
            Self::Request => "request",
        }
    }
}

/// Itemized cost of one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub tier_index: usize,
    pub tier_threshold: u64,
    pub input: Decimal,
    pub output: Decimal,
    #[serde(default)]
    pub thinking: Decimal,
    pub cached_input: Decimal,
    pub cached_output: Decimal,
    pub cache_write_5m: Decimal,
    pub cache_write_1h: Decimal,
    pub image: Decimal,
    pub audio: Decimal,
    pub web_search: Decimal,
    pub request: Decimal,
    pub total: Decimal,
}

impl CostBreakdown {
    pub fn components(&self) -> [(CostComponent, Decimal); 11] {
        [
            (CostComponent::Input, self.input),
            (CostComponent::Output, self.output),
            (CostComponent::Thinking, self.thinking),
            (CostComponent::CachedInput, self.cached_input),
            (CostComponent::CachedOutput, self.cached_output),
            (CostComponent::CacheWrite5m, self.cache_write_5m),
            (CostComponent::CacheWrite1h, self.cache_write_1h),
            (CostComponent::Image, self.image),
            (CostComponent::Audio, self.audio),
            (CostComponent::WebSearch, self.web_search),
            (CostComponent::Request, self.request),
        ]
    }

    /// Components that contributed a non-zero amount.
    pub fn charged(&self) -> impl Iterator<Item = (CostComponent, Decimal)> {
        self.components()
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
    }

    pub fn is_free(&self) -> bool {
        self.total.is_zero()
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "tier {} (from {} tokens)",
            self.tier_index, self.tier_threshold
        )?;
        for (component, amount) in self.charged() {
            writeln!(f, "  {:<15} ${}", component.as_str(), amount.normalize())?;
        }
        write!(f, "  {:<15} ${}", "total", self.total.normalize())
    }
}

/// Prices `usage` against the endpoint's tiered pricing table.
pub fn compute_cost(
    usage: &UsageCounters,
    endpoint: &Endpoint,
) -> Result<CostBreakdown, PricingError> {
    compute_cost_with_tiers(usage, &endpoint.pricing)
}

/// Same as [`compute_cost`] for a bare pricing table.
pub fn compute_cost_with_tiers(
    usage: &UsageCounters,
    tiers: &[PricingTier],
) -> Result<CostBreakdown, PricingError> {
    let (tier_index, tier) = select_tier(tiers, usage.cumulative_billed_tokens)?;
    let multipliers = tier.multipliers();

    let cached_input = match multipliers.cached_input {
        Some(_) => scaled(
            CostComponent::CachedInput,
            tier.input,
            multipliers.cached_input,
            usage.cached_input_tokens,
        )?,
        None => optional(CostComponent::CachedInput, tier.cache_read, usage.cached_input_tokens)?,
    };
    let cached_output = match multipliers.cached_output {
        Some(_) => scaled(
            CostComponent::CachedOutput,
            tier.output,
            multipliers.cached_output,
            usage.cached_output_tokens,
        )?,
        None => optional(
            CostComponent::CachedOutput,
            tier.cache_write,
            usage.cached_output_tokens,
        )?,
    };

    let mut breakdown = CostBreakdown {
        tier_index,
        tier_threshold: tier.threshold,
        input: line(CostComponent::Input, tier.input, usage.input_tokens)?,
        output: line(CostComponent::Output, tier.output, usage.output_tokens)?,
        thinking: optional(CostComponent::Thinking, tier.thinking, usage.thinking_tokens)?,
        cached_input,
        cached_output,
        cache_write_5m: scaled(
            CostComponent::CacheWrite5m,
            tier.input,
            multipliers.write_5m,
            usage.cache_write_5m_tokens,
        )?,
        cache_write_1h: scaled(
            CostComponent::CacheWrite1h,
            tier.input,
            multipliers.write_1h,
            usage.cache_write_1h_tokens,
        )?,
        image: optional(CostComponent::Image, tier.image, usage.image_units)?,
        audio: optional(CostComponent::Audio, tier.audio, usage.audio_units)?,
        web_search: optional(CostComponent::WebSearch, tier.web_search, usage.web_search_calls)?,
        request: optional(CostComponent::Request, tier.request, 1)?,
        total: Decimal::ZERO,
    };
    breakdown.total = breakdown
        .components()
        .iter()
        .try_fold(Decimal::ZERO, |sum, (component, amount)| {
            sum.checked_add(*amount)
                .ok_or(PricingError::overflow(component.as_str()))
        })?;
    Ok(breakdown)
}

fn line(component: CostComponent, rate: Decimal, units: u64) -> Result<Decimal, PricingError> {
    rate.checked_mul(Decimal::from(units))
        .ok_or(PricingError::overflow(component.as_str()))
}

/// Absent rate prices at zero.
fn optional(
    component: CostComponent,
    rate: Option<Decimal>,
    units: u64,
) -> Result<Decimal, PricingError> {
    rate.map_or(Ok(Decimal::ZERO), |r| line(component, r, units))
}

fn scaled(
    component: CostComponent,
    base: Decimal,
    multiplier: Option<Decimal>,
    units: u64,
) -> Result<Decimal, PricingError> {
    let Some(m) = multiplier else {
        return Ok(Decimal::ZERO);
    };
    let rate = base
        .checked_mul(m)
        .ok_or(PricingError::overflow(component.as_str()))?;
    line(component, rate, units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::CacheMultipliers;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sonnet_tiers() -> Vec<PricingTier> {
        let multipliers = CacheMultipliers {
            cached_input: Some(dec!(0.1)),
            write_5m: Some(dec!(1.25)),
            write_1h: Some(dec!(2)),
            ..Default::default()
        };
        vec![
            PricingTier::flat(dec!(0.000003), dec!(0.000015))
                .with_web_search(dec!(0.01))
                .with_multipliers(multipliers),
            PricingTier::flat(dec!(0.000006), dec!(0.0000225))
                .at(200_000)
                .with_multipliers(multipliers),
        ]
    }

    #[test]
    fn test_basic_input_output() {
        let tiers = vec![PricingTier::flat(dec!(0.0000025), dec!(0.00001))];
        let cost = compute_cost_with_tiers(&UsageCounters::new(1000, 500), &tiers).unwrap();
        assert_eq!(cost.input, dec!(0.0025));
        assert_eq!(cost.output, dec!(0.005));
        assert_eq!(cost.total, dec!(0.0075));
    }

    #[test]
    fn test_cache_multipliers_scale_base_rate() {
        let usage = UsageCounters::new(1500, 1000)
            .with_cached(500, 0)
            .with_cache_writes(100, 50);
        let cost = compute_cost_with_tiers(&usage, &sonnet_tiers()).unwrap();

        assert_eq!(cost.input, dec!(0.0045));
        assert_eq!(cost.cached_input, dec!(0.00015));
        assert_eq!(cost.cache_write_5m, dec!(0.000375));
        assert_eq!(cost.cache_write_1h, dec!(0.0003));
        assert_eq!(cost.output, dec!(0.015));
        assert_eq!(cost.total, dec!(0.020325));
    }

    #[test]
    fn test_legacy_flat_cache_rates() {
        let tiers = vec![
            PricingTier::flat(dec!(0.000002), dec!(0.000008))
                .with_cache_rates(Some(dec!(0.0000005)), Some(dec!(0.000004))),
        ];
        let usage = UsageCounters::new(0, 0).with_cached(1000, 100);
        let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
        assert_eq!(cost.cached_input, dec!(0.0005));
        assert_eq!(cost.cached_output, dec!(0.0004));
    }

    #[test]
    fn test_multiplier_takes_precedence_over_flat_rate() {
        let tiers = vec![
            PricingTier::flat(dec!(0.000002), dec!(0.000008))
                .with_cache_rates(Some(dec!(1)), None)
                .with_multipliers(CacheMultipliers {
                    cached_input: Some(dec!(0.25)),
                    ..Default::default()
                }),
        ];
        let usage = UsageCounters::new(0, 0).with_cached(1000, 0);
        let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
        assert_eq!(cost.cached_input, dec!(0.0005));
    }

    #[test]
    fn test_absent_rates_contribute_zero() {
        let tiers = vec![PricingTier::flat(dec!(0.000001), dec!(0.000002))];
        let usage = UsageCounters::new(10, 10)
            .with_cached(100, 100)
            .with_images(3)
            .with_audio(7)
            .with_web_search(2);
        let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
        assert!(cost.cached_input.is_zero());
        assert!(cost.image.is_zero());
        assert!(cost.audio.is_zero());
        assert!(cost.web_search.is_zero());
        assert!(cost.request.is_zero());
        assert_eq!(cost.total, dec!(0.00003));
    }

    #[test]
    fn test_higher_tier_rates_are_not_inherited() {
        let usage = UsageCounters::new(250_000, 50_000)
            .with_web_search(10)
            .billed_after(250_000);
        let cost = compute_cost_with_tiers(&usage, &sonnet_tiers()).unwrap();
        assert_eq!(cost.tier_index, 1);
        assert_eq!(cost.input, dec!(1.5));
        assert_eq!(cost.output, dec!(1.125));
        assert!(cost.web_search.is_zero());
    }

    #[test]
    fn test_per_request_and_search_fees() {
        let tiers = vec![
            PricingTier::flat(dec!(0.000001), dec!(0.000001))
                .with_request(dec!(0.005))
                .with_web_search(dec!(0.005)),
        ];
        let usage = UsageCounters::new(1000, 1000).with_web_search(2);
        let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
        assert_eq!(cost.request, dec!(0.005));
        assert_eq!(cost.web_search, dec!(0.010));
        assert_eq!(cost.total, dec!(0.017));
    }

    #[test]
    fn test_thinking_tokens_use_their_own_rate() {
        let tiers = vec![
            PricingTier::flat(dec!(0.0000003), dec!(0.0000025)).with_thinking(dec!(0.0000035)),
        ];
        let usage = UsageCounters::new(1000, 200).with_thinking(400);
        let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
        assert_eq!(cost.thinking, dec!(0.0014));
        assert_eq!(cost.total, dec!(0.0022));

        let unpriced = vec![PricingTier::flat(dec!(0.0000003), dec!(0.0000025))];
        let cost = compute_cost_with_tiers(&usage, &unpriced).unwrap();
        assert!(cost.thinking.is_zero());
        assert_eq!(cost.total, dec!(0.0008));
    }

    #[test]
    fn test_overflowing_line_item_is_error() {
        let tiers = vec![PricingTier::flat(Decimal::from(10_000_000_000u64), Decimal::ZERO)];
        let err = compute_cost_with_tiers(&UsageCounters::new(u64::MAX, 0), &tiers).unwrap_err();
        assert_eq!(err, PricingError::overflow("input"));

        let tiers = vec![
            PricingTier::flat(Decimal::ZERO, Decimal::ZERO).with_thinking(Decimal::MAX),
        ];
        let usage = UsageCounters::new(0, 0).with_thinking(u64::MAX);
        let err = compute_cost_with_tiers(&usage, &tiers).unwrap_err();
        assert_eq!(err, PricingError::overflow("thinking"));
    }

    #[test]
    fn test_overflowing_total_is_error() {
        let tiers = vec![PricingTier::flat(Decimal::MAX, Decimal::MAX)];
        let err = compute_cost_with_tiers(&UsageCounters::new(1, 1), &tiers).unwrap_err();
        assert_eq!(err, PricingError::overflow("output"));
    }

    #[test]
    fn test_tiny_rates_do_not_drift() {
        let tiers = vec![PricingTier::flat(dec!(0.00000001), dec!(0.00000003))];
        let usage = UsageCounters::new(1, 1);
        let mut running = Decimal::ZERO;
        for _ in 0..100_000 {
            running += compute_cost_with_tiers(&usage, &tiers).unwrap().total;
        }
        assert_eq!(running, dec!(0.004));
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(compute_cost_with_tiers(&UsageCounters::new(1, 1), &[]).is_err());
        let usage = UsageCounters::new(1, 1).billed_after(-5);
        assert!(compute_cost_with_tiers(&usage, &sonnet_tiers()).is_err());
    }

    #[test]
    fn test_display_lists_charged_components() {
        let cost =
            compute_cost_with_tiers(&UsageCounters::new(1000, 0), &sonnet_tiers()).unwrap();
        let text = cost.to_string();
        assert!(text.contains("input"));
        assert!(!text.contains("output"));
        assert!(text.contains("total"));
    }

    fn rate() -> impl Strategy<Value = Decimal> {
        (0u64..10_000_000).prop_map(|n| Decimal::new(n as i64, 10))
    }

    fn optional_rate() -> impl Strategy<Value = Option<Decimal>> {
        prop::option::of(rate())
    }

    fn tier_strategy() -> impl Strategy<Value = PricingTier> {
        (
            rate(),
            rate(),
            optional_rate(),
            optional_rate(),
            optional_rate(),
            optional_rate(),
            optional_rate(),
            optional_rate(),
            prop::option::of((optional_rate(), optional_rate(), optional_rate())),
        )
            .prop_map(|(input, output, thinking, image, audio, search, read, write, mult)| {
                let mut tier = PricingTier::flat(input, output).with_cache_rates(read, write);
                tier.thinking = thinking;
                tier.image = image;
                tier.audio = audio;
                tier.web_search = search;
                if let Some((cached_input, cached_output, write_5m)) = mult {
                    tier = tier.with_multipliers(CacheMultipliers {
                        cached_input,
                        cached_output,
                        write_5m,
                        write_1h: None,
                    });
                }
                tier
            })
    }

    fn table_strategy() -> impl Strategy<Value = Vec<PricingTier>> {
        (prop::collection::vec((tier_strategy(), 1u64..500_000), 1..4)).prop_map(|raw| {
            let mut threshold = 0;
            raw.into_iter()
                .enumerate()
                .map(|(i, (tier, step))| {
                    if i > 0 {
                        threshold += step;
                    }
                    tier.at(threshold)
                })
                .collect()
        })
    }

    fn usage_strategy() -> impl Strategy<Value = UsageCounters> {
        (
            prop::array::uniform9(0u64..2_000_000),
            0i64..3_000_000,
        )
            .prop_map(|(n, cumulative)| UsageCounters {
                input_tokens: n[0],
                output_tokens: n[1],
                thinking_tokens: n[8],
                cached_input_tokens: n[2],
                cached_output_tokens: n[3],
                cache_write_5m_tokens: n[4],
                cache_write_1h_tokens: 0,
                image_units: n[5] % 100,
                audio_units: n[6],
                web_search_calls: n[7] % 50,
                cumulative_billed_tokens: cumulative,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 100, .. ProptestConfig::default() })]

        #[test]
        fn proptest_components_sum_to_total(usage in usage_strategy(), tiers in table_strategy()) {
            let cost = compute_cost_with_tiers(&usage, &tiers).unwrap();
            let sum: Decimal = cost.components().iter().map(|(_, amount)| *amount).sum();
            prop_assert_eq!(sum, cost.total);
        }

        #[test]
        fn proptest_tier_selection_is_monotonic(
            tiers in table_strategy(),
            low in 0i64..2_000_000,
            delta in 0i64..2_000_000,
        ) {
            let usage = UsageCounters::new(100, 100);
            let at_low = compute_cost_with_tiers(&usage.billed_after(low), &tiers).unwrap();
            let at_high = compute_cost_with_tiers(&usage.billed_after(low + delta), &tiers).unwrap();
            prop_assert!(at_high.tier_threshold >= at_low.tier_threshold);
            prop_assert!(at_high.tier_index >= at_low.tier_index);
        }
    }
}
