// Career recommendation engine.
// Ranks career labels for a free-text profile by fusing classifier
// probabilities with embedding similarity. Inference backends sit behind
// the `Classifier` / `Embedder` traits in `model`.

pub mod artifacts;
pub mod centroid;
pub mod handlers;
pub mod hashing;
pub mod loader;
pub mod model;
pub mod models;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod profile;
pub mod ranker;
pub mod similarity;
