//! Author tables compiled into the crate.

use super::builder::CatalogBuilder;
use super::catalog::Catalog;
use super::table::PartialCatalog;

const TABLES: &[(&str, &str)] = &[
    ("anthropic.yaml", include_str!("../../catalog/anthropic.yaml")),
    ("deepseek.yaml", include_str!("../../catalog/deepseek.yaml")),
    ("google.yaml", include_str!("../../catalog/google.yaml")),
    ("meta-llama.yaml", include_str!("../../catalog/meta-llama.yaml")),
    ("mistralai.yaml", include_str!("../../catalog/mistralai.yaml")),
    ("moonshotai.yaml", include_str!("../../catalog/moonshotai.yaml")),
    ("openai.yaml", include_str!("../../catalog/openai.yaml")),
    ("perplexity.yaml", include_str!("../../catalog/perplexity.yaml")),
    ("x-ai.yaml", include_str!("../../catalog/x-ai.yaml")),
];

pub fn builtin_tables() -> crate::Result<Vec<PartialCatalog>> {
    TABLES
        .iter()
        .map(|(source, content)| PartialCatalog::from_yaml(*source, content))
        .collect()
}

impl Catalog {
    /// Catalog built from the tables shipped with the crate.
    pub fn builtin() -> crate::Result<Catalog> {
        Ok(CatalogBuilder::from_tables(builtin_tables()?).build()?)
    }
}
