use serde::{Deserialize, Serialize};

/// Which signal produced a recommendation's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Classifier softmax only.
    Model,
    /// Embedding cosine similarity only.
    Similarity,
    /// Present in both passes, fused 0.6 / 0.4.
    Hybrid,
}

/// A single career with its 0–100 confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCareer {
    pub career: String,
    pub confidence: f64,
    pub method: ScoringMethod,
}

/// Ranked recommendations for one query, highest confidence first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResult {
    pub entries: Vec<ScoredCareer>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCareer> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a ScoredCareer;
    type IntoIter = std::slice::Iter<'a, ScoredCareer>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&ScoringMethod::Hybrid).unwrap();
        assert_eq!(json, r#""hybrid""#);
        let method: ScoringMethod = serde_json::from_str(r#""similarity""#).unwrap();
        assert_eq!(method, ScoringMethod::Similarity);
    }

    #[test]
    fn test_ranked_result_is_a_plain_json_array() {
        let result = RankedResult {
            entries: vec![ScoredCareer {
                career: "Data Scientist".to_string(),
                confidence: 70.0,
                method: ScoringMethod::Model,
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["career"], "Data Scientist");
        assert_eq!(value[0]["method"], "model");
    }
}
