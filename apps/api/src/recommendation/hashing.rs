//! Feature-hashing embedder. Deterministic, no weights to load.
//!
//! Tokens are lowercased words (unigrams, plus bigrams at half weight),
//! hashed with SipHash-1-3 under a fixed key into `dimension` signed buckets,
//! then L2-normalised.

use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use crate::recommendation::model::Embedder;
use crate::recommendation::similarity::l2_normalize;

// Changing these keys changes every embedding.
const HASH_SEED_K0: u64 = 0x6361_7265_6572_5f30;
const HASH_SEED_K1: u64 = 0x6869_6e67_5f76_3031;

pub const DEFAULT_DIMENSION: usize = 256;
const BIGRAM_WEIGHT: f32 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "have", "i", "in", "is", "it",
    "love", "me", "my", "of", "on", "or", "the", "to", "want", "with",
];

pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn accumulate(&self, vector: &mut [f32], token: &str, weight: f32) {
        let h = self.hash(token);
        let bucket = (h % self.dimension as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let tokens = tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];

        for token in &tokens {
            self.accumulate(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Lowercased word tokens. Keeps `+`, `#` and `.` inside words so
/// "c++", "c#" and "node.js" survive.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}
