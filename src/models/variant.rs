use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::endpoint::Endpoint;
use super::spec::{Model, ModelId};

/// A dated or pinned release of a base model.
///
/// `metadata` and `providers` hold sparse overrides. They are kept as raw
/// values so any nested field of the base can be overridden without the
/// variant having to restate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVariant {
    #[serde(default)]
    pub id: ModelId,
    pub base_model_id: ModelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ModelVariant {
    pub fn new(id: impl Into<ModelId>, base_model_id: impl Into<ModelId>) -> Self {
        Self {
            id: id.into(),
            base_model_id: base_model_id.into(),
            providers: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>, overrides: Value) -> Self {
        self.providers
            .get_or_insert_with(BTreeMap::new)
            .insert(provider.into(), overrides);
        self
    }
}

/// A variant with every inherited field materialized.
///
/// `providers` is keyed by the base endpoint's provider key (the part of the
/// endpoint id after the model id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVariant {
    pub id: ModelId,
    pub base_model_id: ModelId,
    pub metadata: Model,
    pub providers: BTreeMap<String, Endpoint>,
}
