//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use llm_catalog::config::{CatalogSettings, ConfigBuilder, MemoryConfigProvider};
//!
//! # async fn example() -> llm_catalog::Result<()> {
//! let config = ConfigBuilder::new()
//!     .env()
//!     .memory(MemoryConfigProvider::new().value("catalog.builtin", "true"))
//!     .build()
//!     .await?;
//! let settings = CatalogSettings::load(&config).await?;
//! let catalog = settings.load_catalog().await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;
pub mod validator;

pub use composite::CompositeConfigProvider;
pub use env::{DEFAULT_ENV_PREFIX, EnvConfigProvider};
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{CatalogSettings, CatalogSource, FILE_NAME_PATTERN, WriterSettings};
pub use validator::{ConfigValidator, ValueType};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "Validation failed: {}", msgs.join("; "))
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Stacks providers; earlier calls take precedence.
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Environment variables under [`DEFAULT_ENV_PREFIX`].
    pub fn env(self) -> Self {
        self.provider(Box::new(EnvConfigProvider::new()))
    }

    pub fn env_with_prefix(self, prefix: &str) -> Self {
        self.provider(Box::new(EnvConfigProvider::prefixed(prefix)))
    }

    pub fn memory(self, provider: MemoryConfigProvider) -> Self {
        self.provider(Box::new(provider))
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub async fn build(self) -> ConfigResult<CompositeConfigProvider> {
        let mut composite = CompositeConfigProvider::new();
        for provider in self.providers {
            composite.add_provider(provider);
        }
        Ok(composite)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let err = ConfigError::ValidationErrors(ValidationErrors(vec![
            ConfigError::InvalidValue {
                key: "catalog.dir".to_string(),
                message: "must not be empty".to_string(),
            },
            ConfigError::InvalidValue {
                key: "catalog.builtin".to_string(),
                message: "expected boolean, got string".to_string(),
            },
        ]));
        assert_eq!(
            err.to_string(),
            "Validation failed: Invalid value for catalog.dir: must not be empty; \
             Invalid value for catalog.builtin: expected boolean, got string"
        );
    }

    #[tokio::test]
    async fn test_builder_order_is_priority() {
        let config = ConfigBuilder::new()
            .env_with_prefix("LLM_CATALOG_BUILDER_TEST_")
            .memory(MemoryConfigProvider::named("first").value("catalog.dir", "a"))
            .memory(MemoryConfigProvider::named("second").value("catalog.dir", "b"))
            .build()
            .await
            .unwrap();

        assert_eq!(config.provider_names(), vec!["env", "first", "second"]);
        assert_eq!(
            config.get_raw("catalog.dir").await.unwrap(),
            Some("a".to_string())
        );
    }
}
