use std::collections::BTreeMap;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::{Value, json};
use thiserror::Error;

use super::catalog::Catalog;
use super::merge::deep_merge;
use super::table::PartialCatalog;
use crate::models::{
    AuthorMetadata, AuthorName, Endpoint, Model, ModelId, ModelVariant, ResolvedVariant,
    endpoint_id, split_endpoint_id,
};
use crate::pricing::validate_tiers;

/// Data-authoring errors found while merging author tables.
///
/// Any of these aborts the whole build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Model '{id}' is defined differently in {first} and {second}")]
    DuplicateModel {
        id: String,
        first: String,
        second: String,
    },

    #[error("Endpoint '{id}' is defined differently in {first} and {second}")]
    DuplicateEndpoint {
        id: String,
        first: String,
        second: String,
    },

    #[error("Variant '{id}' in {second} collides with a definition in {first}")]
    DuplicateVariant {
        id: String,
        first: String,
        second: String,
    },

    #[error("Author '{name}' is described differently in {first} and {second}")]
    DuplicateAuthor {
        name: AuthorName,
        first: String,
        second: String,
    },

    #[error("Variant '{variant}' in {table} extends unknown base model '{base}'")]
    UnknownBaseModel {
        variant: String,
        base: String,
        table: String,
    },

    #[error("Endpoint '{id}' in {table} does not belong to a known model")]
    OrphanEndpoint { id: String, table: String },

    #[error("Endpoint '{id}' in {table} has invalid pricing: {reason}")]
    InvalidPricing {
        id: String,
        table: String,
        reason: String,
    },

    #[error("Variant '{id}' cannot be materialized: {reason}")]
    InvalidVariant { id: String, reason: String },
}

/// Merges per-author tables into one [`Catalog`].
///
/// Tables are processed in lexicographic `source` order, so the result does
/// not depend on the order they were added in.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    tables: Vec<PartialCatalog>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = PartialCatalog>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    pub fn table(mut self, table: PartialCatalog) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(mut self) -> Result<Catalog, BuildError> {
        self.tables.sort_by(|a, b| a.source.cmp(&b.source));

        let mut state = BuildState::default();
        for partial in &self.tables {
            state.merge_author(partial)?;
            state.merge_models(partial)?;
        }
        for partial in &self.tables {
            state.merge_endpoints(partial)?;
        }
        for partial in &self.tables {
            state.merge_variants(partial)?;
        }
        state.resolve_variants()?;

        let catalog = state.finish();
        tracing::info!(
            tables = self.tables.len(),
            models = catalog.models_by_id.len(),
            variants = catalog.variants_by_id.len(),
            endpoints = catalog.endpoints_by_id.len(),
            "catalog built"
        );
        Ok(catalog)
    }
}

#[derive(Default)]
struct BuildState {
    models: IndexMap<ModelId, (Model, String)>,
    endpoints: IndexMap<String, (Endpoint, String)>,
    variants: IndexMap<ModelId, (ModelVariant, String)>,
    authors: BTreeMap<AuthorName, (AuthorMetadata, String)>,
    resolved: IndexMap<ModelId, ResolvedVariant>,
    variant_endpoints: IndexMap<String, Endpoint>,
}

impl BuildState {
    fn merge_author(&mut self, partial: &PartialCatalog) -> Result<(), BuildError> {
        let Some(author) = &partial.table.author else {
            return Ok(());
        };
        match self.authors.get(&author.name) {
            Some((existing, _)) if existing == author => {
                tracing::debug!(author = %author.name, table = %partial.source, "author re-registered");
                Ok(())
            }
            Some((_, first)) => Err(BuildError::DuplicateAuthor {
                name: author.name,
                first: first.clone(),
                second: partial.source.clone(),
            }),
            None => {
                self.authors
                    .insert(author.name, (author.clone(), partial.source.clone()));
                Ok(())
            }
        }
    }

    fn merge_models(&mut self, partial: &PartialCatalog) -> Result<(), BuildError> {
        for (id, model) in &partial.table.models {
            match self.models.entry(id.clone()) {
                Entry::Occupied(slot) => {
                    let (existing, first) = slot.get();
                    if existing != model {
                        return Err(BuildError::DuplicateModel {
                            id: id.clone(),
                            first: first.clone(),
                            second: partial.source.clone(),
                        });
                    }
                    tracing::debug!(model = %id, table = %partial.source, "model re-registered");
                }
                Entry::Vacant(slot) => {
                    slot.insert((model.clone(), partial.source.clone()));
                }
            }
        }
        Ok(())
    }

    fn merge_endpoints(&mut self, partial: &PartialCatalog) -> Result<(), BuildError> {
        for (id, endpoint) in &partial.table.endpoints {
            let known_model = split_endpoint_id(id)
                .map(|(model_id, _)| self.models.contains_key(model_id))
                .unwrap_or(false);
            if !known_model {
                return Err(BuildError::OrphanEndpoint {
                    id: id.clone(),
                    table: partial.source.clone(),
                });
            }
            check_pricing(id, &partial.source, endpoint)?;

            match self.endpoints.entry(id.clone()) {
                Entry::Occupied(slot) => {
                    let (existing, first) = slot.get();
                    if existing != endpoint {
                        return Err(BuildError::DuplicateEndpoint {
                            id: id.clone(),
                            first: first.clone(),
                            second: partial.source.clone(),
                        });
                    }
                    tracing::debug!(endpoint = %id, table = %partial.source, "endpoint re-registered");
                }
                Entry::Vacant(slot) => {
                    slot.insert((endpoint.clone(), partial.source.clone()));
                }
            }
        }
        Ok(())
    }

    fn merge_variants(&mut self, partial: &PartialCatalog) -> Result<(), BuildError> {
        for (key, variant) in &partial.table.variants {
            if key != &variant.id {
                return Err(BuildError::InvalidVariant {
                    id: key.clone(),
                    reason: format!("entry declares id '{}'", variant.id),
                });
            }
            if let Some((_, first)) = self.models.get(key) {
                return Err(BuildError::DuplicateVariant {
                    id: key.clone(),
                    first: first.clone(),
                    second: partial.source.clone(),
                });
            }
            match self.variants.entry(key.clone()) {
                Entry::Occupied(slot) => {
                    let (existing, first) = slot.get();
                    if existing != variant {
                        return Err(BuildError::DuplicateVariant {
                            id: key.clone(),
                            first: first.clone(),
                            second: partial.source.clone(),
                        });
                    }
                    tracing::debug!(variant = %key, table = %partial.source, "variant re-registered");
                }
                Entry::Vacant(slot) => {
                    slot.insert((variant.clone(), partial.source.clone()));
                }
            }
        }
        Ok(())
    }

    fn resolve_variants(&mut self) -> Result<(), BuildError> {
        for (id, (variant, table)) in &self.variants {
            let Some((base, _)) = self.models.get(&variant.base_model_id) else {
                return Err(BuildError::UnknownBaseModel {
                    variant: id.clone(),
                    base: variant.base_model_id.clone(),
                    table: table.clone(),
                });
            };

            let base_endpoints: Vec<(&str, &Endpoint)> = self
                .endpoints
                .iter()
                .filter_map(|(endpoint_id, (endpoint, _))| {
                    let (model_id, key) = split_endpoint_id(endpoint_id)?;
                    (model_id == variant.base_model_id).then_some((key, endpoint))
                })
                .collect();

            let resolved = materialize(variant, base, &base_endpoints)?;
            for (key, endpoint) in &resolved.providers {
                let variant_endpoint_id = endpoint_id(id, key);
                check_pricing(&variant_endpoint_id, table, endpoint)?;
                self.variant_endpoints
                    .insert(variant_endpoint_id, endpoint.clone());
            }
            self.resolved.insert(id.clone(), resolved);
        }
        Ok(())
    }

    fn finish(self) -> Catalog {
        let mut catalog = Catalog {
            authors_by_name: self
                .authors
                .into_iter()
                .map(|(name, (meta, _))| (name, meta))
                .collect(),
            ..Default::default()
        };

        for (id, (model, _)) in self.models {
            *catalog.model_count_by_author.entry(model.author).or_default() += 1;
            catalog.endpoints_by_model_id.insert(id.clone(), Vec::new());
            catalog.models_by_id.insert(id, model);
        }
        for id in self.resolved.keys() {
            catalog.endpoints_by_model_id.insert(id.clone(), Vec::new());
        }
        catalog.variants_by_id = self.resolved;

        let all_endpoints = self
            .endpoints
            .into_iter()
            .map(|(id, (endpoint, _))| (id, endpoint))
            .chain(self.variant_endpoints);
        for (id, endpoint) in all_endpoints {
            if let Some((model_id, _)) = split_endpoint_id(&id)
                && let Some(ids) = catalog.endpoints_by_model_id.get_mut(model_id)
            {
                ids.push(id.clone());
            }
            *catalog
                .model_count_by_provider
                .entry(endpoint.provider.clone())
                .or_default() += 1;
            catalog.endpoints_by_id.insert(id, endpoint);
        }

        for ids in catalog.endpoints_by_model_id.values_mut() {
            // Stable: equal priorities keep table order.
            ids.sort_by_key(|id| {
                catalog
                    .endpoints_by_id
                    .get(id)
                    .and_then(|e| e.priority)
                    .map_or((1, 0), |p| (0, p))
            });
        }
        catalog
    }
}

fn check_pricing(id: &str, table: &str, endpoint: &Endpoint) -> Result<(), BuildError> {
    let invalid = |reason: String| BuildError::InvalidPricing {
        id: id.to_string(),
        table: table.to_string(),
        reason,
    };
    validate_tiers(&endpoint.pricing).map_err(|e| invalid(e.to_string()))?;
    for (selector, config) in &endpoint.endpoint_configs {
        if let Some(pricing) = &config.pricing {
            validate_tiers(pricing).map_err(|e| invalid(format!("selector '{}': {}", selector, e)))?;
        }
    }
    Ok(())
}

fn materialize(
    variant: &ModelVariant,
    base: &Model,
    base_endpoints: &[(&str, &Endpoint)],
) -> Result<ResolvedVariant, BuildError> {
    let invalid = |reason: String| BuildError::InvalidVariant {
        id: variant.id.clone(),
        reason,
    };

    let mut providers = serde_json::Map::new();
    for (key, endpoint) in base_endpoints {
        let value = serde_json::to_value(endpoint).map_err(|e| invalid(e.to_string()))?;
        providers.insert((*key).to_string(), value);
    }
    let base_value = json!({
        "id": variant.id,
        "base_model_id": variant.base_model_id,
        "metadata": serde_json::to_value(base).map_err(|e| invalid(e.to_string()))?,
        "providers": Value::Object(providers),
    });

    let mut overrides = serde_json::Map::new();
    if let Some(metadata) = &variant.metadata {
        overrides.insert("metadata".into(), metadata.clone());
    }
    if let Some(variant_providers) = &variant.providers {
        let value = serde_json::to_value(variant_providers).map_err(|e| invalid(e.to_string()))?;
        overrides.insert("providers".into(), value);
    }

    let merged = deep_merge(&base_value, &Value::Object(overrides));
    serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))
}
