//! Offline writer that regenerates per-author catalog files.
//!
//! Output is deterministic for a given input and `generated_at`, so running
//! the writer twice produces byte-identical files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{AuthorMetadata, Endpoint, Model, ModelId, ModelVariant, endpoint_id};
use crate::registry::{AuthorTable, CatalogIndex, DEFAULT_INDEX_FILE};

pub const DEFAULT_OVERFLOW_FILE: &str = "others.yaml";
const GENERATOR: &str = concat!("llm-catalog ", env!("CARGO_PKG_VERSION"));

/// A model with everything the writer emits for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseModel {
    pub id: ModelId,
    /// Publisher name as reported upstream; grouping ignores case.
    pub creator: String,
    pub model: Model,
    /// Endpoints keyed by provider, written in this order.
    #[serde(default)]
    pub providers: IndexMap<String, Endpoint>,
    #[serde(default)]
    pub variants: BTreeMap<ModelId, ModelVariant>,
}

impl BaseModel {
    pub fn new(id: impl Into<ModelId>, creator: impl Into<String>, model: Model) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            model,
            providers: IndexMap::new(),
            variants: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>, endpoint: Endpoint) -> Self {
        self.providers.insert(provider.into(), endpoint);
        self
    }

    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variants.insert(variant.id.clone(), variant);
        self
    }
}

/// Files produced by one [`RegistryWriter::write`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub files: Vec<PathBuf>,
    pub models: usize,
}

#[derive(Debug, Clone)]
pub struct RegistryWriter {
    target_dir: PathBuf,
    existing_author_files: BTreeSet<String>,
    authors: BTreeMap<String, AuthorMetadata>,
    overflow_file: String,
    index_file: String,
    generated_at: DateTime<Utc>,
}

impl RegistryWriter {
    /// `existing_author_files` names the authors that already have a
    /// dedicated file (`"openai"` or `"openai.yaml"`); every other creator is
    /// written to the overflow file.
    pub fn new(
        target_dir: impl Into<PathBuf>,
        existing_author_files: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            target_dir: target_dir.into(),
            existing_author_files: existing_author_files
                .into_iter()
                .map(|name| author_key(name.as_ref()))
                .collect(),
            authors: BTreeMap::new(),
            overflow_file: DEFAULT_OVERFLOW_FILE.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            generated_at: Utc::now(),
        }
    }

    pub fn overflow_file(mut self, name: impl Into<String>) -> Self {
        self.overflow_file = name.into();
        self
    }

    pub fn index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }

    pub fn generated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.generated_at = timestamp;
        self
    }

    /// Author block to emit at the top of that author's file.
    pub fn author(mut self, metadata: AuthorMetadata) -> Self {
        self.authors
            .insert(metadata.name.as_str().to_string(), metadata);
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Groups `models` into per-file tables, keyed by file name.
    pub fn plan(&self, models: &BTreeMap<String, BaseModel>) -> BTreeMap<String, AuthorTable> {
        let mut files: BTreeMap<String, AuthorTable> = BTreeMap::new();

        for (id, base) in models {
            let creator = author_key(&base.creator);
            // Overflow file mixes creators: no author block.
            let (file, author) = if self.existing_author_files.contains(&creator) {
                (format!("{}.yaml", creator), self.authors.get(&creator).cloned())
            } else {
                (self.overflow_file.clone(), None)
            };

            let table = files.entry(file).or_insert_with(|| AuthorTable {
                author,
                ..Default::default()
            });
            table.models.insert(id.clone(), base.model.clone());
            for (provider, endpoint) in &base.providers {
                table
                    .endpoints
                    .insert(endpoint_id(id, provider), endpoint.clone());
            }
            for (variant_id, variant) in &base.variants {
                let mut variant = variant.clone();
                variant.id = variant_id.clone();
                variant.base_model_id = id.clone();
                table.variants.insert(variant_id.clone(), variant);
            }
        }
        files
    }

    /// File contents keyed by file name, index included.
    pub fn render(&self, models: &BTreeMap<String, BaseModel>) -> crate::Result<BTreeMap<String, String>> {
        let mut rendered = BTreeMap::new();
        for (file, table) in self.plan(models) {
            let body = serde_yaml_bw::to_string(&table).map_err(|e| crate::Error::yaml(&file, e))?;
            let header = self.header(&format!("models: {}", table.models.len()));
            rendered.insert(file, header + &body);
        }

        let index = CatalogIndex {
            files: rendered.keys().cloned().collect(),
        };
        let body = serde_yaml_bw::to_string(&index)
            .map_err(|e| crate::Error::yaml(&self.index_file, e))?;
        let header = self.header(&format!("files: {}", index.files.len()));
        rendered.insert(self.index_file.clone(), header + &body);
        Ok(rendered)
    }

    pub async fn write(&self, models: &BTreeMap<String, BaseModel>) -> crate::Result<WriteSummary> {
        let rendered = self.render(models)?;
        tokio::fs::create_dir_all(&self.target_dir).await?;

        let mut files = Vec::with_capacity(rendered.len());
        for (name, content) in rendered {
            let path = self.target_dir.join(&name);
            tokio::fs::write(&path, content).await?;
            tracing::debug!(file = %path.display(), "catalog file written");
            files.push(path);
        }

        tracing::info!(
            dir = %self.target_dir.display(),
            files = files.len(),
            models = models.len(),
            "catalog files regenerated"
        );
        Ok(WriteSummary {
            files,
            models: models.len(),
        })
    }

    fn header(&self, summary: &str) -> String {
        format!(
            "# Generated by {}. Do not edit by hand.\n# generated_at: {}\n# {}\n\n",
            GENERATOR,
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            summary
        )
    }
}

fn author_key(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix(".yaml").unwrap_or(name).to_lowercase()
}
