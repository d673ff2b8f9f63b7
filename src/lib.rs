//! # llm-catalog
//!
//! Model catalog, parameter compatibility and pricing core for an LLM
//! gateway.
//!
//! Per-author YAML tables are merged into one immutable [`Catalog`] at
//! startup. The gateway then asks it which endpoints serve a model, checks a
//! request body against each endpoint's parameter list, and prices the
//! resulting usage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_catalog::params::{RequestBody, validate};
//! use llm_catalog::pricing::{UsageCounters, compute_cost};
//! use llm_catalog::registry::CatalogLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), llm_catalog::Error> {
//!     let catalog = CatalogLoader::new("catalog").load().await?;
//!     let body: RequestBody = r#"{"model": "gpt-4o", "max_tokens": 512}"#.parse()?;
//!
//!     for endpoint in catalog.endpoints_for_model("gpt-4o") {
//!         if validate(&body, endpoint).is_compatible() {
//!             let usage = UsageCounters::new(1_200, 300);
//!             let cost = compute_cost(&usage, endpoint)?;
//!             println!("{}: {}", endpoint.identity(), cost.total);
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod models;
pub mod params;
pub mod pricing;
pub mod registry;
pub mod writer;

pub use config::{CatalogSettings, ConfigBuilder, ConfigError, ConfigProvider};
pub use models::{
    AuthorMetadata, AuthorName, Endpoint, EndpointConfig, Modality, Model, ModelId, ModelVariant,
    RateLimits, ResolvedVariant, StandardParameter, endpoint_id, split_endpoint_id,
};
pub use params::{RequestBody, ValidationResult, format_validation_errors, translate_legacy};
pub use pricing::{
    BillingLedger, CostBreakdown, PricingError, PricingTier, SpendStatus, UsageCounters,
    compute_cost, compute_cost_with_tiers,
};
pub use registry::{
    BuildError, Catalog, CatalogBuilder, CatalogHandle, CatalogLoader, PartialCatalog,
    load_catalog,
};
pub use writer::{BaseModel, RegistryWriter, WriteSummary};

/// Error type for llm-catalog operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Catalog tables disagree or reference missing entries.
    #[error("Catalog build failed: {0}")]
    Build(#[from] registry::BuildError),

    /// Pricing tiers are malformed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] pricing::PricingError),

    /// A catalog table could not be parsed or rendered.
    #[error("YAML error in {path}: {message}")]
    Yaml { path: String, message: String },

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse caller input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request body is not usable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required environment variable is not valid unicode.
    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Catalog tables need fixing by whoever maintains them
    DataAuthoring,
    /// Settings, environment or catalog location
    Configuration,
    /// Request bodies and other caller input
    InvalidInput,
    /// IO, JSON and unexpected states
    Internal,
}

impl Error {
    pub(crate) fn yaml(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Error::Yaml {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Pricing(pricing::PricingError::Overflow { .. }) => ErrorCategory::InvalidInput,
            Error::Build(_) | Error::Pricing(_) | Error::Yaml { .. } => {
                ErrorCategory::DataAuthoring
            }
            Error::Config(_) | Error::Env(_) => ErrorCategory::Configuration,
            Error::InvalidRequest(_) | Error::Parse(_) => ErrorCategory::InvalidInput,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_data_error(&self) -> bool {
        self.category() == ErrorCategory::DataAuthoring
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Env(e),
            config::ConfigError::Provider { message } => Error::Config(message),
            config::ConfigError::ValidationErrors(errors) => Error::Config(errors.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_names_the_file() {
        let err = Error::yaml("openai.yaml", "mapping values are not allowed here");
        assert_eq!(
            err.to_string(),
            "YAML error in openai.yaml: mapping values are not allowed here"
        );
        assert!(err.is_data_error());
    }

    #[test]
    fn test_error_categories() {
        let pricing = Error::from(pricing::PricingError::InvalidPricingConfig {
            reason: "no tiers".into(),
        });
        assert_eq!(pricing.category(), ErrorCategory::DataAuthoring);

        let request = Error::InvalidRequest("not an object".into());
        assert_eq!(request.category(), ErrorCategory::InvalidInput);

        let overflow = Error::from(pricing::PricingError::Overflow { item: "input" });
        assert_eq!(overflow.category(), ErrorCategory::InvalidInput);

        let io = Error::from(std::io::Error::other("disk"));
        assert_eq!(io.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = config::ConfigError::InvalidValue {
            key: "catalog.dir".to_string(),
            message: "must not be empty".to_string(),
        };
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("catalog.dir"));
    }
}
