//! Vector math and candidate selection for the two ranking passes.

/// Cosine similarity in [-1, 1]. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Cosine similarity of `query` against every row.
pub fn similarities(query: &[f32], rows: &[Vec<f32>]) -> Vec<f32> {
    rows.iter().map(|row| cosine_similarity(query, row)).collect()
}

/// In-place L2 normalisation. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Indices of the `k` largest scores, largest first.
///
/// Stable descending sort: equal scores keep ascending index order.
/// Used for the classifier pass.
pub fn top_k_descending(scores: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    indices.truncate(k);
    indices
}

/// Indices of the `k` largest scores, largest first.
///
/// Stable ascending sort, keep the last `k`, then reverse: equal scores come
/// out in descending index order. Used for the similarity pass.
pub fn top_k_ascending_reversed(scores: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    let start = indices.len().saturating_sub(k);
    let mut top = indices.split_off(start);
    top.reverse();
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors_is_negative() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_descending_ties_keep_lower_index_first() {
        let scores = [0.2, 0.5, 0.5, 0.1];
        assert_eq!(top_k_descending(&scores, 3), vec![1, 2, 0]);
    }

    #[test]
    fn test_top_k_ascending_reversed_ties_put_higher_index_first() {
        let scores = [0.2, 0.5, 0.5, 0.1];
        assert_eq!(top_k_ascending_reversed(&scores, 3), vec![2, 1, 0]);
    }

    #[test]
    fn test_top_k_larger_than_len() {
        let scores = [0.3, 0.9];
        assert_eq!(top_k_descending(&scores, 10), vec![1, 0]);
        assert_eq!(top_k_ascending_reversed(&scores, 10), vec![1, 0]);
    }
}
