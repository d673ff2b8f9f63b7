//! Capability catalog data model.
//!
//! Pure data describing models, the endpoints that host them and the
//! authors that publish them. Behavior lives in [`crate::registry`],
//! [`crate::params`] and [`crate::pricing`].

mod author;
mod endpoint;
mod parameter;
mod spec;
mod variant;

pub use author::{AuthorMetadata, AuthorName};
pub use endpoint::{Endpoint, EndpointConfig, RateLimits, WILDCARD_SELECTOR};
pub use parameter::StandardParameter;
pub use spec::{Modality, Model, ModelId};
pub use variant::{ModelVariant, ResolvedVariant};

/// Joins a model id and provider key into an endpoint id.
pub fn endpoint_id(model_id: &str, provider_key: &str) -> String {
    format!("{}:{}", model_id, provider_key)
}

/// Splits an endpoint id into its model id and provider key.
pub fn split_endpoint_id(endpoint_id: &str) -> Option<(&str, &str)> {
    endpoint_id
        .split_once(':')
        .filter(|(model, provider)| !model.is_empty() && !provider.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_id_round_trip() {
        let id = endpoint_id("gpt-5", "openai");
        assert_eq!(id, "gpt-5:openai");
        assert_eq!(split_endpoint_id(&id), Some(("gpt-5", "openai")));
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert_eq!(split_endpoint_id("gpt-5"), None);
        assert_eq!(split_endpoint_id(":openai"), None);
        assert_eq!(split_endpoint_id("gpt-5:"), None);
    }

    #[test]
    fn test_split_keeps_alias_suffix() {
        assert_eq!(
            split_endpoint_id("claude-sonnet-4:vertex:global"),
            Some(("claude-sonnet-4", "vertex:global"))
        );
    }
}
