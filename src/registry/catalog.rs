use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::models::{AuthorMetadata, AuthorName, Endpoint, Model, ModelId, ResolvedVariant};

/// Immutable, fully merged view of every author table.
///
/// Built once by [`super::CatalogBuilder`]; a refresh builds a new value and
/// swaps it in through [`super::CatalogHandle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub(super) models_by_id: IndexMap<ModelId, Model>,
    pub(super) endpoints_by_id: IndexMap<String, Endpoint>,
    pub(super) variants_by_id: IndexMap<ModelId, ResolvedVariant>,
    pub(super) endpoints_by_model_id: IndexMap<ModelId, Vec<String>>,
    pub(super) model_count_by_author: BTreeMap<AuthorName, usize>,
    pub(super) model_count_by_provider: BTreeMap<String, usize>,
    pub(super) authors_by_name: BTreeMap<AuthorName, AuthorMetadata>,
}

/// Limits in effect for one endpoint. Endpoint values win over the model's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveLimits {
    pub context_length: u64,
    pub max_output_tokens: u64,
}

impl Catalog {
    pub fn models_by_id(&self) -> &IndexMap<ModelId, Model> {
        &self.models_by_id
    }

    pub fn endpoints_by_id(&self) -> &IndexMap<String, Endpoint> {
        &self.endpoints_by_id
    }

    pub fn variants_by_id(&self) -> &IndexMap<ModelId, ResolvedVariant> {
        &self.variants_by_id
    }

    pub fn endpoints_by_model_id(&self) -> &IndexMap<ModelId, Vec<String>> {
        &self.endpoints_by_model_id
    }

    pub fn model_count_by_author(&self) -> &BTreeMap<AuthorName, usize> {
        &self.model_count_by_author
    }

    pub fn model_count_by_provider(&self) -> &BTreeMap<String, usize> {
        &self.model_count_by_provider
    }

    pub fn authors_by_name(&self) -> &BTreeMap<AuthorName, AuthorMetadata> {
        &self.authors_by_name
    }

    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models_by_id.get(id)
    }

    pub fn variant(&self, id: &str) -> Option<&ResolvedVariant> {
        self.variants_by_id.get(id)
    }

    pub fn endpoint(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints_by_id.get(id)
    }

    pub fn author(&self, name: AuthorName) -> Option<&AuthorMetadata> {
        self.authors_by_name.get(&name)
    }

    /// Model metadata for a base model or a materialized variant.
    pub fn resolve_model(&self, name: &str) -> Option<&Model> {
        self.models_by_id
            .get(name)
            .or_else(|| self.variants_by_id.get(name).map(|v| &v.metadata))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models_by_id.contains_key(name) || self.variants_by_id.contains_key(name)
    }

    /// Candidate endpoints in fallback order: `priority` ascending (unset
    /// last), then table order.
    pub fn endpoints_for_model(&self, name: &str) -> Vec<&Endpoint> {
        self.endpoint_ids_for_model(name)
            .iter()
            .filter_map(|id| self.endpoints_by_id.get(id))
            .collect()
    }

    pub fn endpoint_ids_for_model(&self, name: &str) -> &[String] {
        self.endpoints_by_model_id
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn effective_limits(&self, endpoint_id: &str) -> Option<EffectiveLimits> {
        let endpoint = self.endpoints_by_id.get(endpoint_id)?;
        let (model_id, _) = crate::models::split_endpoint_id(endpoint_id)?;
        let model = self.resolve_model(model_id)?;
        Some(EffectiveLimits {
            context_length: prefer_endpoint(endpoint.context_length, model.context_length),
            max_output_tokens: prefer_endpoint(
                endpoint.max_completion_tokens,
                model.max_output_tokens,
            ),
        })
    }

    pub fn len(&self) -> usize {
        self.models_by_id.len() + self.variants_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models_by_id.is_empty() && self.variants_by_id.is_empty()
    }
}

// Zero on an endpoint means the provider did not publish the limit.
fn prefer_endpoint(endpoint: u64, model: u64) -> u64 {
    if endpoint > 0 { endpoint } else { model }
}
