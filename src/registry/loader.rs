use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::builder::CatalogBuilder;
use super::catalog::Catalog;
use super::table::PartialCatalog;

pub const DEFAULT_INDEX_FILE: &str = "index.yaml";

/// The index file: every author table in the directory, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIndex {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Reads author tables from a catalog directory.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    dir: PathBuf,
    index_file: String,
}

impl CatalogLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }

    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load_dir(dir: impl Into<PathBuf>) -> crate::Result<Catalog> {
        Self::new(dir).load().await
    }

    pub async fn load(&self) -> crate::Result<Catalog> {
        let tables = self.load_tables().await?;
        let catalog = CatalogBuilder::from_tables(tables).build()?;
        tracing::info!(dir = %self.dir.display(), models = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Files named by the index, or every `*.yaml` beside it when there is
    /// no index.
    pub async fn table_files(&self) -> crate::Result<Vec<String>> {
        let index_path = self.dir.join(&self.index_file);
        if tokio::fs::try_exists(&index_path).await? {
            let content = read(&index_path).await?;
            let index: CatalogIndex = serde_yaml_bw::from_str(&content)
                .map_err(|e| crate::Error::yaml(index_path.display(), e))?;
            return Ok(index.files);
        }

        let pattern = glob::Pattern::escape(&self.dir.to_string_lossy()) + "/*.yaml";
        let paths = glob::glob(&pattern)
            .map_err(|e| crate::Error::Config(format!("Invalid catalog path {:?}: {}", self.dir, e)))?;

        let mut files: Vec<String> = paths
            .filter_map(|entry| entry.ok())
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| name != &self.index_file)
            .collect();
        files.sort();
        Ok(files)
    }

    pub async fn load_tables(&self) -> crate::Result<Vec<PartialCatalog>> {
        let files = self.table_files().await?;
        let loads = files.into_iter().map(|name| async move {
            let path = self.dir.join(&name);
            let content = read(&path).await?;
            tracing::debug!(file = %name, "author table read");
            PartialCatalog::from_yaml(name, &content)
        });
        futures::future::try_join_all(loads).await
    }
}

async fn read(path: &Path) -> crate::Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        crate::Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DEEPSEEK: &str = r#"
models:
  deepseek-v3:
    name: "DeepSeek: V3"
    author: deepseek
    context_length: 128000
    max_output_tokens: 8192
    created: "2024-12-26T00:00:00.000Z"
    modality: text->text
    tokenizer: DeepSeek
endpoints:
  "deepseek-v3:deepseek":
    provider: deepseek
    provider_model_id: deepseek-chat
    pricing:
      - input: "0.00000027"
        output: "0.0000011"
    context_length: 128000
    max_completion_tokens: 8192
    supported_parameters: [max_tokens, temperature, stream]
"#;

    #[tokio::test]
    async fn test_load_without_index_globs_yaml() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("deepseek.yaml"), DEEPSEEK)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored")
            .await
            .unwrap();

        let loader = CatalogLoader::new(dir.path());
        assert_eq!(loader.table_files().await.unwrap(), vec!["deepseek.yaml"]);

        let catalog = loader.load().await.unwrap();
        assert!(catalog.contains("deepseek-v3"));
        assert_eq!(catalog.endpoints_for_model("deepseek-v3").len(), 1);
    }

    #[tokio::test]
    async fn test_index_limits_files() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("deepseek.yaml"), DEEPSEEK)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("draft.yaml"), "models: [broken")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("index.yaml"), "files:\n  - deepseek.yaml\n")
            .await
            .unwrap();

        let catalog = CatalogLoader::load_dir(dir.path()).await.unwrap();
        assert_eq!(catalog.models_by_id().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_indexed_file_is_io_error() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("index.yaml"), "files: [gone.yaml]\n")
            .await
            .unwrap();

        let err = CatalogLoader::load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
        assert!(err.to_string().contains("gone.yaml"));
    }

    #[tokio::test]
    async fn test_parse_error_is_yaml_error() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("bad.yaml"), "models: [broken")
            .await
            .unwrap();

        let err = CatalogLoader::load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, crate::Error::Yaml { .. }));
    }
}
