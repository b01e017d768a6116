//! Axum route handlers for model lifecycle and recommendations.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::lookup::{LearningResources, SalaryInfo};
use crate::recommendation::loader::load_model_context;
use crate::recommendation::models::{RankedResult, ScoredCareer};
use crate::recommendation::profile::CareerProfile;
use crate::recommendation::ranker::{ModelInfo, RecommendationRanker, DEFAULT_TOP_K};
use crate::state::AppState;

const MAX_TOP_K: usize = 50;
const DEFAULT_THRESHOLD: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub profile: CareerProfile,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_true")]
    pub use_hybrid: bool,
    /// Attach learning resources and salary bands to each recommendation.
    #[serde(default = "default_true")]
    pub enrich: bool,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub scored: ScoredCareer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<LearningResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInfo>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
    /// Minimum confidence on a 0–1 scale.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Option<ScoredCareer>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the artifacts in `MODEL_DIR` and installs them in the ranker.
///
/// Artifact parsing and label embedding are CPU-bound, so they run on the
/// blocking pool. Called at startup when `EAGER_MODEL_LOAD` is set and by
/// `POST /api/v1/model/load`.
pub async fn load_model(state: &AppState) -> Result<ModelInfo, AppError> {
    if state.ranker.is_loaded() {
        return Err(AppError::Conflict("Model is already loaded".to_string()));
    }

    let model_dir = state.config.model_dir.clone();
    let backend = state.config.embedding_backend;
    let context = tokio::task::spawn_blocking(move || load_model_context(&model_dir, backend))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    state.ranker.initialize(context)?;
    let model_info = state.ranker.model_info()?;
    info!(
        labels = model_info.num_labels,
        classifier = model_info.classifier_backend,
        "model loaded"
    );
    Ok(model_info)
}

/// Runs a ranking call on the blocking pool; classifier inference can be slow.
async fn rank_blocking(
    ranker: Arc<RecommendationRanker>,
    query: String,
    top_k: usize,
    use_hybrid: bool,
) -> Result<RankedResult, AppError> {
    let ranked = tokio::task::spawn_blocking(move || ranker.rank(&query, top_k, use_hybrid))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(ranked)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/model/load
pub async fn handle_load_model(
    State(state): State<AppState>,
) -> Result<Json<ModelInfo>, AppError> {
    Ok(Json(load_model(&state).await?))
}

/// GET /api/v1/model/info
pub async fn handle_model_info(
    State(state): State<AppState>,
) -> Result<Json<ModelInfo>, AppError> {
    Ok(Json(state.ranker.model_info()?))
}

/// GET /api/v1/careers
pub async fn handle_careers(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.ranker.careers()?))
}

/// POST /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    if request.profile.is_blank() {
        return Err(AppError::Validation(
            "profile.description cannot be empty".to_string(),
        ));
    }
    if request.top_k == 0 || request.top_k > MAX_TOP_K {
        return Err(AppError::Validation(format!(
            "top_k must be between 1 and {MAX_TOP_K}"
        )));
    }

    let query = request.profile.to_query();
    let ranked = rank_blocking(
        state.ranker.clone(),
        query.clone(),
        request.top_k,
        request.use_hybrid,
    )
    .await?;
    debug!(
        returned = ranked.len(),
        top_k = request.top_k,
        use_hybrid = request.use_hybrid,
        "recommendations ranked"
    );

    let lookups = &state.lookups;
    let recommendations = ranked
        .entries
        .into_iter()
        .map(|scored| {
            let (resources, salary) = if request.enrich {
                (
                    Some(lookups.resources.resources_for(&scored.career).0.clone()),
                    Some(lookups.salaries.salary_for(&scored.career).0.clone()),
                )
            } else {
                (None, None)
            };
            Recommendation {
                scored,
                resources,
                salary,
            }
        })
        .collect();

    Ok(Json(RecommendationResponse {
        query,
        recommendations,
    }))
}

/// POST /api/v1/recommendations/predict
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    if !(0.0..=1.0).contains(&request.threshold) {
        return Err(AppError::Validation(
            "threshold must be between 0.0 and 1.0".to_string(),
        ));
    }

    let ranker = state.ranker.clone();
    let PredictRequest { text, threshold } = request;
    let prediction = tokio::task::spawn_blocking(move || ranker.predict(&text, threshold))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(PredictResponse { prediction }))
}
