use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::lookup::books::DEFAULT_BOOK_COUNT;
use crate::lookup::{
    Book, CategorizedBook, LearningResources, MatchKind, Roadmap, SalaryInfo,
};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResourcesResponse {
    pub career: String,
    pub match_kind: MatchKind,
    pub resources: LearningResources,
}

#[derive(Serialize)]
pub struct SalaryResponse {
    pub career: String,
    pub match_kind: MatchKind,
    pub salary: SalaryInfo,
}

#[derive(Serialize)]
pub struct BooksResponse {
    pub career: String,
    pub match_kind: MatchKind,
    pub books: Vec<Book>,
}

#[derive(Serialize)]
pub struct RoadmapResponse {
    pub career: String,
    pub match_kind: MatchKind,
    /// roadmap.sh page for the exact career name.
    pub roadmap_url: String,
    pub roadmap: Roadmap,
}

#[derive(Deserialize)]
pub struct BookCountQuery {
    pub count: Option<usize>,
}

#[derive(Deserialize)]
pub struct BookSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct BookSearchResponse {
    pub query: String,
    pub results: Vec<CategorizedBook>,
}

/// GET /api/v1/careers/:career/resources
pub async fn handle_resources(
    State(state): State<AppState>,
    Path(career): Path<String>,
) -> Json<ResourcesResponse> {
    let (resources, match_kind) = state.lookups.resources.resources_for(&career);
    Json(ResourcesResponse {
        career,
        match_kind,
        resources: resources.clone(),
    })
}

/// GET /api/v1/careers/:career/salary
pub async fn handle_salary(
    State(state): State<AppState>,
    Path(career): Path<String>,
) -> Json<SalaryResponse> {
    let (salary, match_kind) = state.lookups.salaries.salary_for(&career);
    Json(SalaryResponse {
        career,
        match_kind,
        salary: salary.clone(),
    })
}

/// GET /api/v1/careers/:career/books?count=
pub async fn handle_books(
    State(state): State<AppState>,
    Path(career): Path<String>,
    Query(params): Query<BookCountQuery>,
) -> Json<BooksResponse> {
    let count = params.count.unwrap_or(DEFAULT_BOOK_COUNT);
    let (books, match_kind) = state.lookups.books.books_for(&career, count);
    Json(BooksResponse {
        career,
        match_kind,
        books: books.to_vec(),
    })
}

/// GET /api/v1/careers/:career/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    Path(career): Path<String>,
) -> Json<RoadmapResponse> {
    let (roadmap, match_kind) = state.lookups.roadmaps.roadmap_for(&career);
    let roadmap_url = state.lookups.roadmaps.roadmap_url(&career);
    Json(RoadmapResponse {
        career,
        match_kind,
        roadmap_url,
        roadmap,
    })
}

/// GET /api/v1/books/categories
pub async fn handle_book_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .lookups
            .books
            .categories()
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

/// GET /api/v1/books/search?q=
pub async fn handle_book_search(
    State(state): State<AppState>,
    Query(params): Query<BookSearchQuery>,
) -> Result<Json<BookSearchResponse>, AppError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query parameter 'q' must not be empty".into()));
    }
    let results = state.lookups.books.search_books(query);
    Ok(Json(BookSearchResponse {
        query: query.to_string(),
        results,
    }))
}

/// GET /api/v1/roadmaps
pub async fn handle_roadmap_careers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .lookups
            .roadmaps
            .careers()
            .into_iter()
            .map(String::from)
            .collect(),
    )
}
