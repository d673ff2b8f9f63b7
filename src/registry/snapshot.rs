use std::sync::Arc;

use arc_swap::ArcSwap;

use super::builder::{BuildError, CatalogBuilder};
use super::catalog::Catalog;
use super::loader::CatalogLoader;
use super::table::PartialCatalog;

/// Shared handle to the current catalog snapshot.
///
/// Readers take an `Arc<Catalog>` and keep it for as long as they need;
/// a rebuild publishes a new snapshot with one pointer swap and never
/// touches the one readers already hold.
#[derive(Debug)]
pub struct CatalogHandle {
    current: ArcSwap<Catalog>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    pub fn current(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Publishes `catalog` and returns the snapshot it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        self.publish(Arc::new(catalog))
    }

    /// Builds from `tables` off to the side; the current snapshot is kept
    /// if the build fails. Returns the snapshot this call published.
    pub fn rebuild(&self, tables: Vec<PartialCatalog>) -> Result<Arc<Catalog>, BuildError> {
        let next = Arc::new(CatalogBuilder::from_tables(tables).build()?);
        self.publish(next.clone());
        Ok(next)
    }

    fn publish(&self, next: Arc<Catalog>) -> Arc<Catalog> {
        let models = next.len();
        let previous = self.current.swap(next);
        tracing::info!(
            models,
            previous_models = previous.len(),
            "catalog snapshot replaced"
        );
        previous
    }

    pub async fn reload(&self, loader: &CatalogLoader) -> crate::Result<Arc<Catalog>> {
        let tables = loader.load_tables().await?;
        Ok(self.rebuild(tables)?)
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl From<Catalog> for CatalogHandle {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorName, Modality, Model};
    use crate::registry::AuthorTable;

    fn table(model_id: &str) -> PartialCatalog {
        let model = Model {
            name: model_id.into(),
            author: AuthorName::Deepseek,
            description: String::new(),
            context_length: 64_000,
            max_output_tokens: 8_000,
            created: "2025-01-20T00:00:00.000Z".into(),
            modality: Modality::Legacy("text->text".into()),
            tokenizer: "DeepSeek".into(),
        };
        PartialCatalog::new("deepseek.yaml", AuthorTable::new().with_model(model_id, model))
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let handle = CatalogHandle::default();
        let before = handle.current();
        assert!(before.is_empty());

        handle.rebuild(vec![table("deepseek-r1")]).unwrap();

        assert!(before.is_empty());
        assert!(handle.current().contains("deepseek-r1"));
    }

    #[test]
    fn test_failed_rebuild_keeps_current() {
        let handle = CatalogHandle::default();
        handle.rebuild(vec![table("deepseek-v3")]).unwrap();

        let mut bad = table("deepseek-v3");
        bad.table.models["deepseek-v3"].context_length = 1;
        let mut dup = table("deepseek-v3");
        dup.source = "deepseek-extra.yaml".into();

        assert!(handle.rebuild(vec![bad, dup]).is_err());
        assert_eq!(handle.current().model("deepseek-v3").unwrap().context_length, 64_000);
    }

    #[test]
    fn test_rebuild_returns_the_snapshot_it_published() {
        let handle = CatalogHandle::default();
        let built = handle.rebuild(vec![table("deepseek-r1")]).unwrap();
        assert!(Arc::ptr_eq(&built, &handle.current()));

        let replaced = handle.replace(Catalog::default());
        assert!(Arc::ptr_eq(&built, &replaced));
        assert!(built.contains("deepseek-r1"));
    }

    #[test]
    fn test_replace_returns_previous() {
        let handle = CatalogHandle::default();
        let previous = handle.replace(Catalog::default());
        assert!(previous.is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(CatalogHandle::default());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let snapshot = handle.current();
                        assert!(snapshot.is_empty() || snapshot.contains("deepseek-r1"));
                    }
                })
            })
            .collect();
        handle.rebuild(vec![table("deepseek-r1")]).unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
