//! Centroid classifier: softmax over cosine similarity to one centroid per label.
//!
//! Stands in for a trained classification head when only an embedder and
//! label centroids are available.

use std::sync::Arc;

use crate::recommendation::model::{Classifier, Embedder, EmbeddingMatrix};
use crate::recommendation::similarity::similarities;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub struct CentroidClassifier {
    embedder: Arc<dyn Embedder>,
    centroids: EmbeddingMatrix,
    temperature: f32,
}

impl CentroidClassifier {
    pub fn new(embedder: Arc<dyn Embedder>, centroids: EmbeddingMatrix, temperature: f32) -> Self {
        Self {
            embedder,
            centroids,
            temperature: if temperature > 0.0 {
                temperature
            } else {
                DEFAULT_TEMPERATURE
            },
        }
    }
}

impl Classifier for CentroidClassifier {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn classify(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let query = self.embedder.embed(text)?;
        anyhow::ensure!(
            query.len() == self.centroids.dim(),
            "query embedding has {} dims, centroids have {}",
            query.len(),
            self.centroids.dim()
        );
        let logits: Vec<f32> = similarities(&query, self.centroids.rows())
            .into_iter()
            .map(|s| s / self.temperature)
            .collect();
        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / logits.len().max(1) as f32; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}
