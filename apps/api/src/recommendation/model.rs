//! Loaded model state shared by every ranking request.
//!
//! A `ModelContext` bundles the ordered label set, the classifier and the
//! optional embedding index. It is built once, then only read.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::recommendation::artifacts::ModelMetadata;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("Model not loaded. Initialize the recommendation model first.")]
    ModelNotLoaded,

    #[error("Model is already initialized")]
    AlreadyInitialized,

    #[error("Label set is empty")]
    EmptyLabelSet,

    #[error("Duplicate label in label set: {0}")]
    DuplicateLabel(String),

    #[error("Embedding matrix has {rows} rows but the label set has {labels} labels")]
    MatrixRowMismatch { rows: usize, labels: usize },

    #[error("Embedding row {row} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Classifier returned {found} probabilities for {expected} labels")]
    ClassifierOutputMismatch { expected: usize, found: usize },

    #[error("Embedder returned a {found}-dim vector, index expects {expected}")]
    QueryDimensionMismatch { expected: usize, found: usize },

    /// Classifier or embedder failure, passed through untouched.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Text → probability vector aligned with the model's `LabelSet`.
pub trait Classifier: Send + Sync {
    /// Backend name, reported by the model info endpoint.
    fn name(&self) -> &'static str;

    fn classify(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Text → fixed-length embedding vector.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Ordered, unique career labels. Index `i` is shared by the classifier
/// output and row `i` of the embedding matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, RankError> {
        if labels.is_empty() {
            return Err(RankError::EmptyLabelSet);
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(RankError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Labels in alphabetical order.
    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.labels.clone();
        sorted.sort();
        sorted
    }
}

/// Precomputed label embeddings, one row per label.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: Vec<Vec<f32>>,
    dim: usize,
}

impl EmbeddingMatrix {
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, RankError> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dim {
                return Err(RankError::DimensionMismatch {
                    row,
                    expected: dim,
                    found: values.len(),
                });
            }
        }
        Ok(Self { rows, dim })
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// Embedder paired with the label matrix it searches.
#[derive(Clone)]
pub struct SimilarityIndex {
    pub embedder: Arc<dyn Embedder>,
    pub matrix: EmbeddingMatrix,
}

/// Everything `rank` reads. Immutable once constructed.
#[derive(Clone)]
pub struct ModelContext {
    labels: LabelSet,
    classifier: Arc<dyn Classifier>,
    similarity: Option<SimilarityIndex>,
    metadata: ModelMetadata,
}

impl ModelContext {
    pub fn new(labels: LabelSet, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            labels,
            classifier,
            similarity: None,
            metadata: ModelMetadata::default(),
        }
    }

    /// Attaches the embedding index. Rows must line up with the label set.
    pub fn with_similarity(
        mut self,
        embedder: Arc<dyn Embedder>,
        matrix: EmbeddingMatrix,
    ) -> Result<Self, RankError> {
        if matrix.len() != self.labels.len() {
            return Err(RankError::MatrixRowMismatch {
                rows: matrix.len(),
                labels: self.labels.len(),
            });
        }
        self.similarity = Some(SimilarityIndex { embedder, matrix });
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn similarity(&self) -> Option<&SimilarityIndex> {
        self.similarity.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelContext")
            .field("labels", &self.labels)
            .field("classifier", &self.classifier.name())
            .field(
                "embedder",
                &self.similarity.as_ref().map(|s| s.embedder.name()),
            )
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier;

    impl Classifier for FixedClassifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn classify(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![1.0])
        }
    }

    struct ZeroEmbedder;

    impl Embedder for ZeroEmbedder {
        fn name(&self) -> &'static str {
            "zero"
        }

        fn dimension(&self) -> usize {
            2
        }

        fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![0.0, 0.0])
        }
    }

    #[test]
    fn test_empty_label_set_rejected() {
        assert!(matches!(LabelSet::new(vec![]), Err(RankError::EmptyLabelSet)));
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = LabelSet::new(vec!["A".into(), "B".into(), "A".into()]).unwrap_err();
        assert!(matches!(err, RankError::DuplicateLabel(ref l) if l == "A"));
    }

    #[test]
    fn test_sorted_labels_do_not_reorder_index_space() {
        let labels = LabelSet::new(vec!["Zoo Keeper".into(), "Analyst".into()]).unwrap();
        assert_eq!(labels.sorted(), vec!["Analyst", "Zoo Keeper"]);
        assert_eq!(labels.as_slice()[0], "Zoo Keeper");
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let err = EmbeddingMatrix::new(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            RankError::DimensionMismatch {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_matrix_rows_must_match_labels() {
        let labels = LabelSet::new(vec!["A".into()]).unwrap();
        let matrix = EmbeddingMatrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let result = ModelContext::new(labels, Arc::new(FixedClassifier))
            .with_similarity(Arc::new(ZeroEmbedder), matrix);
        assert!(matches!(
            result,
            Err(RankError::MatrixRowMismatch { rows: 2, labels: 1 })
        ));
    }

    #[test]
    fn test_context_debug_names_backends() {
        let labels = LabelSet::new(vec!["A".into()]).unwrap();
        let matrix = EmbeddingMatrix::new(vec![vec![1.0, 0.0]]).unwrap();
        let context = ModelContext::new(labels, Arc::new(FixedClassifier))
            .with_similarity(Arc::new(ZeroEmbedder), matrix)
            .unwrap();
        let debug = format!("{context:?}");
        assert!(debug.contains(r#"classifier: "fixed""#), "{debug}");
        assert!(debug.contains(r#"embedder: Some("zero")"#), "{debug}");
    }
}
