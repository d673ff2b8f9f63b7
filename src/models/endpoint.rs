use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::author::AuthorName;
use super::parameter::StandardParameter;
use crate::pricing::PricingTier;

/// Selector matching every region or deployment.
pub const WILDCARD_SELECTOR: &str = "*";

/// A model as hosted by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub provider: String,
    pub provider_model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorName>,
    pub pricing: Vec<PricingTier>,
    pub context_length: u64,
    pub max_completion_tokens: u64,
    #[serde(default)]
    pub supported_parameters: Vec<StandardParameter>,
    /// Explicit deny-list; wins over `supported_parameters`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_parameters: Vec<StandardParameter>,
    #[serde(default)]
    pub ptb_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<RateLimits>,
    /// Fallback order among endpoints of one model; lower is tried first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoint_configs: BTreeMap<String, EndpointConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpd: Option<u64>,
}

/// Sparse per-region overrides layered on an endpoint's base fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Vec<PricingTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_parameters: Option<Vec<StandardParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported_parameters: Option<Vec<StandardParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptb_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<RateLimits>,
}

impl EndpointConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn apply_to(&self, endpoint: &mut Endpoint) {
        if let Some(id) = &self.provider_model_id {
            endpoint.provider_model_id = id.clone();
        }
        if let Some(pricing) = &self.pricing {
            endpoint.pricing = pricing.clone();
        }
        if let Some(context_length) = self.context_length {
            endpoint.context_length = context_length;
        }
        if let Some(max) = self.max_completion_tokens {
            endpoint.max_completion_tokens = max;
        }
        if let Some(params) = &self.supported_parameters {
            endpoint.supported_parameters = params.clone();
        }
        if let Some(params) = &self.unsupported_parameters {
            endpoint.unsupported_parameters = params.clone();
        }
        if let Some(enabled) = self.ptb_enabled {
            endpoint.ptb_enabled = enabled;
        }
        if let Some(limits) = self.rate_limits {
            endpoint.rate_limits = Some(limits);
        }
    }
}

impl Endpoint {
    pub fn supports(&self, param: &StandardParameter) -> bool {
        self.supported_parameters.contains(param) && !self.unsupported_parameters.contains(param)
    }

    /// `provider/provider_model_id`, as used in diagnostics.
    pub fn identity(&self) -> String {
        format!("{}/{}", self.provider, self.provider_model_id)
    }

    /// Config for `selector`, falling back to the wildcard entry.
    pub fn config_for(&self, selector: &str) -> Option<&EndpointConfig> {
        self.endpoint_configs
            .get(selector)
            .or_else(|| self.endpoint_configs.get(WILDCARD_SELECTOR))
    }

    /// The endpoint as deployed under `selector`.
    ///
    /// Overrides are applied field by field; fields the config leaves out keep
    /// the base endpoint's value.
    pub fn for_selector(&self, selector: &str) -> Endpoint {
        let mut resolved = self.clone();
        if let Some(config) = self.config_for(selector) {
            config.apply_to(&mut resolved);
        }
        resolved
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.endpoint_configs.keys().map(String::as_str)
    }
}
