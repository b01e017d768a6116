//! Model artifacts on disk.
//!
//! `MODEL_DIR` layout:
//! - `model_metadata.json`: training metadata, returned verbatim by the info endpoint
//! - `labels.json`: ordered career labels (strings, or `{career, keywords}` objects)
//! - `career_embeddings.json`: optional `[[f32]]`, one row per label
//! - `model.onnx`, `classifier.onnx`, `tokenizer.json`: only for the `onnx` backend

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

pub const METADATA_FILE: &str = "model_metadata.json";
pub const LABELS_FILE: &str = "labels.json";
pub const EMBEDDINGS_FILE: &str = "career_embeddings.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metadata declares {declared} classes but {found} labels were loaded")]
    ClassCountMismatch { declared: usize, found: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_dim: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropout: Option<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of `model_metadata.json`. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_classes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config: Option<TrainingConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelMetadata {
    pub fn base_model(&self) -> Option<&str> {
        self.model_config
            .as_ref()
            .and_then(|c| c.base_model.as_deref())
    }
}

/// One entry of `labels.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LabelEntry {
    Name(String),
    Described {
        career: String,
        #[serde(default)]
        keywords: Vec<String>,
    },
}

impl LabelEntry {
    pub fn career(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Described { career, .. } => career,
        }
    }

    /// Text that represents this label when embedding it.
    pub fn embedding_text(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Described { career, keywords } if keywords.is_empty() => career.clone(),
            Self::Described { career, keywords } => format!("{career} {}", keywords.join(" ")),
        }
    }
}

/// Everything read from `MODEL_DIR`, before any backend is built.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub dir: PathBuf,
    pub metadata: ModelMetadata,
    pub labels: Vec<LabelEntry>,
    pub embeddings: Option<Vec<Vec<f32>>>,
}

impl ModelArtifacts {
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let metadata: ModelMetadata = read_json(&dir.join(METADATA_FILE))?;
        let labels: Vec<LabelEntry> = read_json(&dir.join(LABELS_FILE))?;

        if let Some(declared) = metadata.num_classes {
            if declared != labels.len() {
                return Err(ArtifactError::ClassCountMismatch {
                    declared,
                    found: labels.len(),
                });
            }
        }

        let embeddings_path = dir.join(EMBEDDINGS_FILE);
        let embeddings = if embeddings_path.exists() {
            Some(read_json::<Vec<Vec<f32>>>(&embeddings_path)?)
        } else {
            None
        };

        info!(
            dir = %dir.display(),
            labels = labels.len(),
            precomputed_embeddings = embeddings.is_some(),
            "read model artifacts"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            metadata,
            labels,
            embeddings,
        })
    }

    pub fn career_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.career().to_string()).collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
