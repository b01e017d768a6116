//! Hybrid career ranking: classifier softmax fused with embedding similarity.
//!
//! Algorithm (per query):
//! 1. Model pass: top `min(2k, |labels|)` classifier probabilities, ×100, descending.
//! 2. Similarity pass (hybrid only): cosine of the query embedding against every
//!    label row, top `min(2k, |labels|)` picked by ascending sort + reverse.
//! 3. Fusion: a similarity hit already in the model list becomes
//!    `0.6 × model + 0.4 × similarity` (method `hybrid`); otherwise it is appended.
//! 4. Stable sort by confidence descending, truncate to `k`.
//!
//! The ranker owns its `ModelContext` behind a `OnceLock`: one explicit
//! `initialize` call, no implicit reloads.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::recommendation::artifacts::ModelMetadata;
use crate::recommendation::model::{ModelContext, RankError};
use crate::recommendation::models::{RankedResult, ScoredCareer, ScoringMethod};
use crate::recommendation::similarity::{similarities, top_k_ascending_reversed, top_k_descending};

pub const DEFAULT_TOP_K: usize = 5;
pub const MODEL_WEIGHT: f64 = 0.6;
pub const SIMILARITY_WEIGHT: f64 = 0.4;

struct LoadedModel {
    context: ModelContext,
    loaded_at: DateTime<Utc>,
}

/// Summary of the loaded model for the info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub metadata: ModelMetadata,
    pub num_labels: usize,
    pub classifier_backend: &'static str,
    pub embedder_backend: Option<&'static str>,
    pub embedding_dim: Option<usize>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct RecommendationRanker {
    model: OnceLock<LoadedModel>,
}

impl RecommendationRanker {
    /// A ranker with no model. Every ranking call fails with `ModelNotLoaded`
    /// until `initialize` succeeds.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn with_context(context: ModelContext) -> Self {
        let ranker = Self::unloaded();
        // A fresh OnceLock is always empty.
        let _ = ranker.model.set(LoadedModel {
            context,
            loaded_at: Utc::now(),
        });
        ranker
    }

    /// Installs the model. Only the first call succeeds.
    pub fn initialize(&self, context: ModelContext) -> Result<(), RankError> {
        self.model
            .set(LoadedModel {
                context,
                loaded_at: Utc::now(),
            })
            .map_err(|_| RankError::AlreadyInitialized)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn loaded(&self) -> Result<&LoadedModel, RankError> {
        self.model.get().ok_or(RankError::ModelNotLoaded)
    }

    /// Ranks careers for a free-text profile.
    ///
    /// Blank queries are not rejected here; whatever the classifier or embedder
    /// does with them is returned as-is.
    pub fn rank(
        &self,
        query: &str,
        top_k: usize,
        use_hybrid: bool,
    ) -> Result<RankedResult, RankError> {
        let model = self.loaded()?;
        rank_with_context(&model.context, query, top_k, use_hybrid)
    }

    /// Top recommendation, if its confidence reaches `threshold` (0–1 scale).
    pub fn predict(&self, query: &str, threshold: f64) -> Result<Option<ScoredCareer>, RankError> {
        let ranked = self.rank(query, 1, true)?;
        Ok(ranked
            .entries
            .into_iter()
            .next()
            .filter(|top| top.confidence >= threshold * 100.0))
    }

    /// Every label the model can output, alphabetically.
    pub fn careers(&self) -> Result<Vec<String>, RankError> {
        Ok(self.loaded()?.context.labels().sorted())
    }

    pub fn model_info(&self) -> Result<ModelInfo, RankError> {
        let model = self.loaded()?;
        let context = &model.context;
        Ok(ModelInfo {
            metadata: context.metadata().clone(),
            num_labels: context.labels().len(),
            classifier_backend: context.classifier().name(),
            embedder_backend: context.similarity().map(|s| s.embedder.name()),
            embedding_dim: context.similarity().map(|s| s.matrix.dim()),
            loaded_at: model.loaded_at,
        })
    }
}

/// The ranking procedure over an explicit context.
pub fn rank_with_context(
    context: &ModelContext,
    query: &str,
    top_k: usize,
    use_hybrid: bool,
) -> Result<RankedResult, RankError> {
    let labels = context.labels();
    if labels.is_empty() {
        return Err(RankError::EmptyLabelSet);
    }

    let pool = top_k.saturating_mul(2).min(labels.len());

    // Model pass
    let probabilities = context.classifier().classify(query)?;
    if probabilities.len() != labels.len() {
        return Err(RankError::ClassifierOutputMismatch {
            expected: labels.len(),
            found: probabilities.len(),
        });
    }

    let mut combined: Vec<ScoredCareer> = Vec::with_capacity(pool * 2);
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(pool * 2);

    for index in top_k_descending(&probabilities, pool) {
        let career = labels.as_slice()[index].clone();
        positions.insert(career.clone(), combined.len());
        combined.push(ScoredCareer {
            career,
            confidence: f64::from(probabilities[index]) * 100.0,
            method: ScoringMethod::Model,
        });
    }

    // Similarity pass + fusion
    let mut fused = 0usize;
    if use_hybrid {
        if let Some(index) = context.similarity() {
            let query_vec = index.embedder.embed(query)?;
            if query_vec.len() != index.matrix.dim() {
                return Err(RankError::QueryDimensionMismatch {
                    expected: index.matrix.dim(),
                    found: query_vec.len(),
                });
            }

            let scores = similarities(&query_vec, index.matrix.rows());

            for row in top_k_ascending_reversed(&scores, pool) {
                let career = &labels.as_slice()[row];
                let similarity_confidence = f64::from(scores[row]) * 100.0;

                match positions.get(career) {
                    Some(&position) => {
                        let existing = &mut combined[position];
                        existing.confidence = existing.confidence * MODEL_WEIGHT
                            + similarity_confidence * SIMILARITY_WEIGHT;
                        existing.method = ScoringMethod::Hybrid;
                        fused += 1;
                    }
                    None => {
                        positions.insert(career.clone(), combined.len());
                        combined.push(ScoredCareer {
                            career: career.clone(),
                            confidence: similarity_confidence,
                            method: ScoringMethod::Similarity,
                        });
                    }
                }
            }
        }
    }

    debug!(
        pool,
        candidates = combined.len(),
        fused,
        use_hybrid,
        "ranked career candidates"
    );

    // Stable: equal confidences keep model-then-similarity order.
    combined.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    combined.truncate(top_k);

    Ok(RankedResult { entries: combined })
}
