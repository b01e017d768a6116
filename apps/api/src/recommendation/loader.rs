//! Builds a `ModelContext` from the artifacts in `MODEL_DIR`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::recommendation::artifacts::ModelArtifacts;
use crate::recommendation::centroid::{CentroidClassifier, DEFAULT_TEMPERATURE};
use crate::recommendation::hashing::{HashingEmbedder, DEFAULT_DIMENSION};
use crate::recommendation::model::{Embedder, EmbeddingMatrix, LabelSet, ModelContext};

/// Which inference backend produces classifier and embedder outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Feature hashing + centroid classifier. No weights required.
    Hash,
    /// ONNX Runtime models from `MODEL_DIR` (requires the `onnx` feature).
    Onnx,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "onnx" => Ok(Self::Onnx),
            other => anyhow::bail!("unknown embedding backend '{other}' (expected 'hash' or 'onnx')"),
        }
    }
}

/// Reads `model_dir` and builds the full ranking context for `backend`.
pub fn load_model_context(model_dir: &Path, backend: EmbeddingBackend) -> Result<ModelContext> {
    let artifacts = ModelArtifacts::load(model_dir)
        .with_context(|| format!("loading model artifacts from {}", model_dir.display()))?;

    let context = match backend {
        EmbeddingBackend::Hash => build_hashing_context(artifacts)?,
        EmbeddingBackend::Onnx => build_onnx_context(artifacts)?,
    };

    info!(
        labels = context.labels().len(),
        classifier = context.classifier().name(),
        "recommendation model ready"
    );
    Ok(context)
}

/// Label matrix computed by embedding each label's text once.
fn embed_labels(artifacts: &ModelArtifacts, embedder: &dyn Embedder) -> Result<EmbeddingMatrix> {
    let rows = artifacts
        .labels
        .iter()
        .map(|label| embedder.embed(&label.embedding_text()))
        .collect::<Result<Vec<_>>>()
        .context("embedding career labels")?;
    Ok(EmbeddingMatrix::new(rows)?)
}

pub fn build_hashing_context(artifacts: ModelArtifacts) -> Result<ModelContext> {
    if artifacts.embeddings.is_some() {
        warn!("precomputed career embeddings ignored by the hash backend");
    }

    let labels = LabelSet::new(artifacts.career_names())?;
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(DEFAULT_DIMENSION));
    let matrix = embed_labels(&artifacts, embedder.as_ref())?;

    let classifier = CentroidClassifier::new(embedder.clone(), matrix.clone(), DEFAULT_TEMPERATURE);

    Ok(ModelContext::new(labels, Arc::new(classifier))
        .with_similarity(embedder, matrix)?
        .with_metadata(artifacts.metadata))
}

#[cfg(feature = "onnx")]
fn build_onnx_context(artifacts: ModelArtifacts) -> Result<ModelContext> {
    use crate::recommendation::onnx::{OnnxClassifier, OnnxEmbedder};

    let labels = LabelSet::new(artifacts.career_names())?;
    let classifier = OnnxClassifier::load(&artifacts.dir)?;
    let embedder: Arc<dyn Embedder> = Arc::new(OnnxEmbedder::load(&artifacts.dir)?);

    let matrix = match &artifacts.embeddings {
        Some(rows) => EmbeddingMatrix::new(rows.clone())?,
        None => embed_labels(&artifacts, embedder.as_ref())?,
    };
    anyhow::ensure!(
        matrix.dim() == embedder.dimension(),
        "career embeddings have {} dims but the embedder produces {}",
        matrix.dim(),
        embedder.dimension()
    );

    Ok(ModelContext::new(labels, Arc::new(classifier))
        .with_similarity(embedder, matrix)?
        .with_metadata(artifacts.metadata))
}

#[cfg(not(feature = "onnx"))]
fn build_onnx_context(_artifacts: ModelArtifacts) -> Result<ModelContext> {
    anyhow::bail!("EMBEDDING_BACKEND=onnx requires building with `--features onnx`")
}
