//! Configuration provider trait

use serde::{Serialize, de::DeserializeOwned};

use super::{ConfigError, ConfigResult};

/// Source of raw string settings keyed by dotted names (`catalog.dir`).
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: &str) -> ConfigResult<()>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> ConfigResult<bool>;

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>>;
}

/// Typed access on top of [`ConfigProvider`]; values are stored as JSON.
pub trait ConfigProviderExt: ConfigProvider {
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            let Some(raw) = self.get_raw(key).await? else {
                return Ok(None);
            };
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        }
    }

    fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> impl std::future::Future<Output = ConfigResult<()>> + Send
    where
        Self: Sync,
    {
        async move {
            let raw = serde_json::to_string(value)?;
            self.set_raw(key, &raw).await
        }
    }

    /// Reads `key` as JSON, falling back to the raw text as a JSON string.
    ///
    /// Environment variables hold bare text (`/srv/catalog`), while typed
    /// writes through [`ConfigProviderExt::set`] hold JSON (`"/srv/catalog"`).
    fn get_value(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<serde_json::Value>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self.get_raw(key).await?.map(|raw| {
                serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
            }))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
