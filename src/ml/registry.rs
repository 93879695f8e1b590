use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::models::ModelFile;
use super::{ModelMetadata, SequenceModel};
use crate::config::ModelsConfig;
use crate::error::{ForecastError, Result};

const MODEL_EXTENSION: &str = "json";

#[derive(Debug, Deserialize)]
struct MetadataFile {
    models: Vec<ModelMetadata>,
}

/// `DE_v3.json` -> `("DE", 3)`.
pub fn parse_model_file_name(file_name: &str) -> Option<(String, u32)> {
    let stem = file_name.strip_suffix(&format!(".{MODEL_EXTENSION}"))?;
    let (country, version) = stem.split_once("_v")?;
    if country.is_empty() || country.contains('_') {
        return None;
    }
    let version = version.parse().ok()?;
    Some((country.to_string(), version))
}

/// Trained models stored as `<CC>_v<N>.json` next to a `metadata.json` registry.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
    metadata_path: PathBuf,
}

impl ModelRegistry {
    pub fn new(dir: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            metadata_path: metadata_path.into(),
        }
    }

    pub fn from_config(config: &ModelsConfig) -> Self {
        Self::new(config.dir.clone(), config.metadata_path())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn model_files(&self) -> Result<Vec<(String, u32)>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(parsed) = entry.file_name().to_str().and_then(parse_model_file_name) {
                files.push(parsed);
            }
        }
        Ok(files)
    }

    /// Country codes with at least one model, sorted.
    pub async fn available_countries(&self) -> Result<Vec<String>> {
        let countries: BTreeSet<String> = self
            .model_files()
            .await?
            .into_iter()
            .map(|(country, _)| country)
            .collect();
        Ok(countries.into_iter().collect())
    }

    /// Name of the highest-versioned model for `country`.
    pub async fn latest_model_for(&self, country: &str) -> Result<String> {
        self.model_files()
            .await?
            .into_iter()
            .filter(|(c, _)| c == country)
            .max_by_key(|(_, version)| *version)
            .map(|(c, version)| format!("{c}_v{version}"))
            .ok_or_else(|| ForecastError::UnknownModel(format!("no model available for {country}")))
    }

    /// Exact-name lookup in the metadata registry.
    pub async fn metadata(&self, name: &str) -> Result<ModelMetadata> {
        let raw = tokio::fs::read_to_string(&self.metadata_path).await?;
        let file: MetadataFile = serde_json::from_str(&raw)?;
        let mut matches = file.models.into_iter().filter(|m| m.name == name);
        match (matches.next(), matches.next()) {
            (Some(meta), None) => Ok(meta),
            _ => Err(ForecastError::UnknownModel(name.to_string())),
        }
    }

    pub async fn load(&self, name: &str) -> Result<Box<dyn SequenceModel>> {
        let path = self.dir.join(format!("{name}.{MODEL_EXTENSION}"));
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForecastError::UnknownModel(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let file: ModelFile = serde_json::from_str(&raw)
            .map_err(|e| ForecastError::Model(format!("{}: {e}", path.display())))?;
        debug!(model = name, "model loaded");
        Ok(file.into_model())
    }
}
