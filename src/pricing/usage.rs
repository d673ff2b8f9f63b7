use serde::{Deserialize, Serialize};

/// Usage reported for one completed call.
///
/// `input_tokens` counts uncached prompt tokens only; cached reads and cache
/// writes are reported separately. `thinking_tokens` are reasoning tokens not
/// already included in `output_tokens`. `cumulative_billed_tokens` is the
/// number of tokens already billed in the current period and selects the tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default)]
    pub thinking_tokens: u64,
    #[serde(default)]
    pub cached_input_tokens: u64,
    #[serde(default)]
    pub cached_output_tokens: u64,
    #[serde(default)]
    pub cache_write_5m_tokens: u64,
    #[serde(default)]
    pub cache_write_1h_tokens: u64,
    #[serde(default)]
    pub image_units: u64,
    #[serde(default)]
    pub audio_units: u64,
    #[serde(default)]
    pub web_search_calls: u64,
    #[serde(default)]
    pub cumulative_billed_tokens: i64,
}

impl UsageCounters {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            ..Default::default()
        }
    }

    pub fn with_thinking(mut self, tokens: u64) -> Self {
        self.thinking_tokens = tokens;
        self
    }

    pub fn with_cached(mut self, cached_input: u64, cached_output: u64) -> Self {
        self.cached_input_tokens = cached_input;
        self.cached_output_tokens = cached_output;
        self
    }

    pub fn with_cache_writes(mut self, write_5m: u64, write_1h: u64) -> Self {
        self.cache_write_5m_tokens = write_5m;
        self.cache_write_1h_tokens = write_1h;
        self
    }

    pub fn with_images(mut self, units: u64) -> Self {
        self.image_units = units;
        self
    }

    pub fn with_audio(mut self, units: u64) -> Self {
        self.audio_units = units;
        self
    }

    pub fn with_web_search(mut self, calls: u64) -> Self {
        self.web_search_calls = calls;
        self
    }

    pub fn billed_after(mut self, cumulative_billed_tokens: i64) -> Self {
        self.cumulative_billed_tokens = cumulative_billed_tokens;
        self
    }

    /// Every token this call adds to the billing period.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.thinking_tokens)
            .saturating_add(self.cached_input_tokens)
            .saturating_add(self.cached_output_tokens)
            .saturating_add(self.cache_write_5m_tokens)
            .saturating_add(self.cache_write_1h_tokens)
    }
}
