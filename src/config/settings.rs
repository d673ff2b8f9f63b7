//! Where the catalog comes from and how the writer names its files.
//!
//! | key                    | default       |
//! |------------------------|---------------|
//! | `catalog.dir`          | unset         |
//! | `catalog.builtin`      | `true`        |
//! | `writer.overflow_file` | `others.yaml` |
//! | `writer.index_file`    | `index.yaml`  |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::validator::{ConfigValidator, ValueType};
use super::{ConfigError, ConfigResult};
use crate::registry::{Catalog, CatalogLoader, DEFAULT_INDEX_FILE};
use crate::writer::{DEFAULT_OVERFLOW_FILE, RegistryWriter};

/// File names the catalog and writer accept: no directories, lowercase.
pub const FILE_NAME_PATTERN: &str = r"^[a-z0-9][a-z0-9._-]*\.yaml$";

const KEYS: [(&str, ValueType); 4] = [
    ("catalog.dir", ValueType::String),
    ("catalog.builtin", ValueType::Boolean),
    ("writer.overflow_file", ValueType::String),
    ("writer.index_file", ValueType::String),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    /// Directory of author tables; takes precedence over the built-in set.
    pub dir: Option<PathBuf>,
    pub builtin: bool,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            dir: None,
            builtin: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    pub overflow_file: String,
    pub index_file: String,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            overflow_file: DEFAULT_OVERFLOW_FILE.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub catalog: CatalogSource,
    pub writer: WriterSettings,
}

impl CatalogSettings {
    /// Reads every known key from `provider`, validates, and fills defaults.
    pub async fn load<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let mut tree = Map::new();
        for (key, expected) in KEYS {
            let Some(value) = provider.get_value(key).await? else {
                continue;
            };
            // Bare text that happens to parse as JSON (`catalog.dir=2025`)
            // is still a string.
            let value = match (expected, value) {
                (ValueType::String, Value::Number(n)) => Value::String(n.to_string()),
                (ValueType::String, Value::Bool(b)) => Value::String(b.to_string()),
                (_, value) => value,
            };
            insert_nested(&mut tree, key, value);
        }
        let tree = Value::Object(tree);

        validator()?.validate(&tree)?;
        let settings: Self = serde_json::from_value(tree)?;
        settings.check()?;

        tracing::debug!(
            provider = provider.name(),
            dir = ?settings.catalog.dir,
            builtin = settings.catalog.builtin,
            "catalog settings loaded"
        );
        Ok(settings)
    }

    /// Loads the catalog these settings point at.
    pub async fn load_catalog(&self) -> crate::Result<Catalog> {
        if let Some(dir) = &self.catalog.dir {
            return CatalogLoader::new(dir)
                .with_index_file(&self.writer.index_file)
                .load()
                .await;
        }
        if self.catalog.builtin {
            return builtin_catalog();
        }
        Err(crate::Error::Config(
            "no catalog source: set catalog.dir or enable catalog.builtin".into(),
        ))
    }

    /// A writer targeting `target_dir` with the configured file names.
    pub fn registry_writer(
        &self,
        target_dir: impl Into<PathBuf>,
        existing_author_files: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> RegistryWriter {
        RegistryWriter::new(target_dir, existing_author_files)
            .overflow_file(&self.writer.overflow_file)
            .index_file(&self.writer.index_file)
    }

    fn check(&self) -> ConfigResult<()> {
        if self.writer.overflow_file == self.writer.index_file {
            return Err(ConfigError::InvalidValue {
                key: "writer.overflow_file".into(),
                message: format!(
                    "'{}' is also the index file",
                    self.writer.overflow_file
                ),
            });
        }
        Ok(())
    }
}

fn validator() -> ConfigResult<ConfigValidator> {
    let mut validator = ConfigValidator::new().custom("catalog.dir", |value| {
        match value.as_str() {
            Some(dir) if dir.trim().is_empty() => Err("must not be empty".into()),
            _ => Ok(()),
        }
    });
    for (key, expected) in KEYS {
        validator = validator.expect_type(key, expected);
    }
    validator
        .expect_pattern("writer.overflow_file", FILE_NAME_PATTERN)?
        .expect_pattern("writer.index_file", FILE_NAME_PATTERN)
}

fn insert_nested(tree: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        Some((head, rest)) => {
            let child = tree
                .entry(head)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_nested(child, rest, value);
            }
        }
        None => {
            tree.insert(key.to_string(), value);
        }
    }
}

#[cfg(feature = "builtin-catalog")]
fn builtin_catalog() -> crate::Result<Catalog> {
    Catalog::builtin()
}

#[cfg(not(feature = "builtin-catalog"))]
fn builtin_catalog() -> crate::Result<Catalog> {
    Err(crate::Error::Config(
        "catalog.builtin is set but the builtin-catalog feature is disabled".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;

    #[tokio::test]
    async fn test_defaults_when_nothing_is_set() {
        let settings = CatalogSettings::load(&MemoryConfigProvider::new())
            .await
            .unwrap();
        assert_eq!(settings, CatalogSettings::default());
        assert!(settings.catalog.builtin);
        assert_eq!(settings.writer.overflow_file, "others.yaml");
        assert_eq!(settings.writer.index_file, "index.yaml");
    }

    #[tokio::test]
    async fn test_bare_and_json_values() {
        let provider = MemoryConfigProvider::new()
            .value("catalog.dir", "/srv/catalog")
            .value("catalog.builtin", "false")
            .value("writer.overflow_file", "\"misc.yaml\"");

        let settings = CatalogSettings::load(&provider).await.unwrap();
        assert_eq!(settings.catalog.dir, Some(PathBuf::from("/srv/catalog")));
        assert!(!settings.catalog.builtin);
        assert_eq!(settings.writer.overflow_file, "misc.yaml");
    }

    #[tokio::test]
    async fn test_numeric_dir_stays_a_string() {
        let provider = MemoryConfigProvider::new().value("catalog.dir", "2025");
        let settings = CatalogSettings::load(&provider).await.unwrap();
        assert_eq!(settings.catalog.dir, Some(PathBuf::from("2025")));
    }

    #[tokio::test]
    async fn test_rejects_bad_values() {
        let provider = MemoryConfigProvider::new()
            .value("catalog.builtin", "sometimes")
            .value("writer.index_file", "../index.yaml");

        let err = CatalogSettings::load(&provider).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("catalog.builtin"));
        assert!(message.contains("writer.index_file"));
    }

    #[tokio::test]
    async fn test_rejects_overflow_equal_to_index() {
        let provider = MemoryConfigProvider::new().value("writer.overflow_file", "index.yaml");
        let err = CatalogSettings::load(&provider).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "writer.overflow_file"));
    }

    #[tokio::test]
    async fn test_no_source_is_a_config_error() {
        let settings = CatalogSettings {
            catalog: CatalogSource {
                dir: None,
                builtin: false,
            },
            ..Default::default()
        };
        let err = settings.load_catalog().await.unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[cfg(feature = "builtin-catalog")]
    #[tokio::test]
    async fn test_builtin_catalog_by_default() {
        let catalog = CatalogSettings::default().load_catalog().await.unwrap();
        assert!(catalog.contains("gpt-4o"));
    }

    #[test]
    fn test_registry_writer_uses_file_names() {
        let settings = CatalogSettings {
            writer: WriterSettings {
                overflow_file: "misc.yaml".into(),
                index_file: "files.yaml".into(),
            },
            ..Default::default()
        };
        let writer = settings.registry_writer("out", ["openai"]);
        assert_eq!(writer.target_dir(), std::path::Path::new("out"));
    }
}
