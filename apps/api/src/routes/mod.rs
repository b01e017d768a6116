pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::coach::handlers as coach;
use crate::errors::AppError;
use crate::lookup::handlers as lookup;
use crate::recommendation::handlers as recommendation;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Model lifecycle
        .route("/api/v1/model/load", post(recommendation::handle_load_model))
        .route("/api/v1/model/info", get(recommendation::handle_model_info))
        // Recommendations
        .route("/api/v1/careers", get(recommendation::handle_careers))
        .route(
            "/api/v1/recommendations",
            post(recommendation::handle_recommendations),
        )
        .route(
            "/api/v1/recommendations/predict",
            post(recommendation::handle_predict),
        )
        // Lookup tables
        .route(
            "/api/v1/careers/:career/resources",
            get(lookup::handle_resources),
        )
        .route("/api/v1/careers/:career/salary", get(lookup::handle_salary))
        .route("/api/v1/careers/:career/books", get(lookup::handle_books))
        .route("/api/v1/careers/:career/roadmap", get(lookup::handle_roadmap))
        .route(
            "/api/v1/books/categories",
            get(lookup::handle_book_categories),
        )
        .route("/api/v1/books/search", get(lookup::handle_book_search))
        .route("/api/v1/roadmaps", get(lookup::handle_roadmap_careers))
        // AI career coach
        .route("/api/v1/coach/chat", post(coach::handle_chat))
        .route("/api/v1/coach/chat/stream", post(coach::handle_chat_stream))
        .route("/api/v1/coach/interview", post(coach::handle_interview))
        .route(
            "/api/v1/coach/learning-plan",
            post(coach::handle_learning_plan),
        )
        .route("/api/v1/coach/resume", post(coach::handle_resume))
        .route(
            "/api/v1/coach/salary-negotiation",
            post(coach::handle_salary_negotiation),
        )
        .route("/api/v1/coach/models", get(coach::handle_models))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let app = build_router(AppState::for_tests(None));
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["chat_enabled"], false);
    }

    #[tokio::test]
    async fn test_resources_with_percent_encoded_career() {
        let (status, body) = get_json("/api/v1/careers/ML%20Engineer/resources").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["career"], "ML Engineer");
        assert_eq!(body["match_kind"], "synonym");
        assert!(body["resources"]["courses"].is_array());
    }

    #[tokio::test]
    async fn test_salary_default_tier() {
        let (_, body) = get_json("/api/v1/careers/Zookeeper/salary").await;
        assert_eq!(body["match_kind"], "default");
        assert_eq!(body["salary"]["entry"], "$60,000 - $85,000");
    }

    #[tokio::test]
    async fn test_books_count_query() {
        let (_, body) = get_json("/api/v1/careers/DevOps/books?count=2").await;
        assert_eq!(body["match_kind"], "exact");
        assert_eq!(body["books"].as_array().unwrap().len(), 2);

        let (_, body) = get_json("/api/v1/careers/DevOps/books").await;
        assert!(body["books"].as_array().unwrap().len() <= 6);
    }

    #[tokio::test]
    async fn test_roadmap_includes_site_link() {
        let (_, body) = get_json("/api/v1/careers/Backend%20Developer/roadmap").await;
        assert_eq!(body["roadmap_url"], "https://roadmap.sh/backend");
        assert_eq!(body["roadmap"]["title"], "Backend Developer Roadmap");

        let (_, body) = get_json("/api/v1/careers/Astronaut/roadmap").await;
        assert_eq!(body["roadmap_url"], "https://roadmap.sh");
        assert_eq!(body["roadmap"]["title"], "Astronaut Roadmap");
    }

    #[tokio::test]
    async fn test_book_catalogue_endpoints() {
        let (_, body) = get_json("/api/v1/books/categories").await;
        assert_eq!(body.as_array().unwrap().len(), 12);

        let (status, body) = get_json("/api/v1/books/search?q=docker").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "docker");

        let (status, _) = get_json("/api/v1/books/search?q=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_roadmap_careers() {
        let (_, body) = get_json("/api/v1/roadmaps").await;
        assert_eq!(
            body,
            serde_json::json!([
                "Frontend Developer",
                "Backend Developer",
                "DevOps Engineer",
                "Data Scientist"
            ])
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = get_json("/api/v2/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_model_info_unloaded() {
        let (status, body) = get_json("/api/v1/model/info").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "MODEL_NOT_LOADED");
    }
}
