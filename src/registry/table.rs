use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{AuthorMetadata, Endpoint, Model, ModelId, ModelVariant};

/// One author's slice of the catalog, as authored on disk.
///
/// Maps keep file order so builds and rewrites stay diff-stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorMetadata>,
    #[serde(default)]
    pub models: IndexMap<ModelId, Model>,
    /// Keyed by endpoint id, `"{model_id}:{provider_key}"`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub endpoints: IndexMap<String, Endpoint>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variants: IndexMap<ModelId, ModelVariant>,
}

impl AuthorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: AuthorMetadata) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_model(mut self, id: impl Into<ModelId>, model: Model) -> Self {
        self.models.insert(id.into(), model);
        self
    }

    pub fn with_endpoint(mut self, id: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.insert(id.into(), endpoint);
        self
    }

    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variants.insert(variant.id.clone(), variant);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.models.is_empty()
            && self.endpoints.is_empty()
            && self.variants.is_empty()
    }

    /// Variant entries may omit `id`; the map key supplies it.
    fn fill_variant_ids(&mut self) {
        for (key, variant) in self.variants.iter_mut() {
            if variant.id.is_empty() {
                variant.id = key.clone();
            }
        }
    }
}

/// A table plus the name of the file (or fixture) it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialCatalog {
    pub source: String,
    pub table: AuthorTable,
}

impl PartialCatalog {
    pub fn new(source: impl Into<String>, table: AuthorTable) -> Self {
        Self {
            source: source.into(),
            table,
        }
    }

    pub fn from_yaml(source: impl Into<String>, content: &str) -> crate::Result<Self> {
        let source = source.into();
        let mut table: AuthorTable = if content.trim().is_empty() {
            AuthorTable::default()
        } else {
            serde_yaml_bw::from_str(content).map_err(|e| crate::Error::yaml(&source, e))?
        };
        table.fill_variant_ids();
        Ok(Self { source, table })
    }
}
