//! Chains providers; the first one holding a key wins.

use std::collections::BTreeSet;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Appends a provider below every provider added so far.
    pub fn add_provider(&mut self, provider: Box<dyn ConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl Default for CompositeConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key).await? {
                tracing::trace!(key, provider = provider.name(), "config value resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Writes to the highest-priority provider only.
    async fn set_raw(&self, key: &str, value: &str) -> ConfigResult<()> {
        if let Some(provider) = self.providers.first() {
            provider.set_raw(key, value).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> ConfigResult<bool> {
        let mut deleted = false;
        for provider in &self.providers {
            deleted |= provider.delete(key).await?;
        }
        Ok(deleted)
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let mut keys = BTreeSet::new();
        for provider in &self.providers {
            keys.extend(provider.list_keys(prefix).await?);
        }
        Ok(keys.into_iter().collect())
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("provider_names", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    fn layered() -> CompositeConfigProvider {
        let overrides = MemoryConfigProvider::named("overrides").value("catalog.dir", "/srv/a");
        let defaults = MemoryConfigProvider::named("defaults")
            .value("catalog.dir", "/srv/b")
            .value("catalog.builtin", "false");

        CompositeConfigProvider::new()
            .provider(Box::new(overrides))
            .provider(Box::new(defaults))
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let composite = layered();
        assert_eq!(
            composite.get_raw("catalog.dir").await.unwrap(),
            Some("/srv/a".to_string())
        );
        assert_eq!(
            composite.get_raw("catalog.builtin").await.unwrap(),
            Some("false".to_string())
        );
        assert_eq!(composite.get_raw("writer.index_file").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys_deduplicates() {
        let keys = layered().list_keys("catalog.").await.unwrap();
        assert_eq!(keys, vec!["catalog.builtin", "catalog.dir"]);
    }

    #[tokio::test]
    async fn test_delete_reaches_every_provider() {
        let composite = layered();
        assert!(composite.delete("catalog.dir").await.unwrap());
        assert_eq!(composite.get_raw("catalog.dir").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_targets_first_provider() {
        let composite = layered();
        composite.set_raw("writer.index_file", "files.yaml").await.unwrap();
        assert_eq!(
            composite.get_raw("writer.index_file").await.unwrap(),
            Some("files.yaml".to_string())
        );
        assert_eq!(composite.provider_names(), vec!["overrides", "defaults"]);
        assert_eq!(composite.provider_count(), 2);
    }
}
