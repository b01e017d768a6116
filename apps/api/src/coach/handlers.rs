use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::coach::prompts;
use crate::errors::AppError;
use crate::llm_client::{AdviceOptions, AVAILABLE_MODELS};
use crate::recommendation::models::RankedResult;
use crate::state::AppState;

const MAX_QUESTION_COUNT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Prior recommendations; the top three are summarised for the coach.
    #[serde(default)]
    pub recommendations: Option<RankedResult>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoachReply {
    pub reply: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub career: String,
    #[serde(default = "default_question_type")]
    pub question_type: String,
    #[serde(default = "default_question_count")]
    pub count: u32,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LearningPlanRequest {
    pub current_role: String,
    pub target_role: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeRequest {
    pub resume_text: String,
    pub target_role: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalaryNegotiationRequest {
    pub career: String,
    pub offered_salary: String,
    pub experience_years: u32,
    #[serde(default = "default_location")]
    pub location: String,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub default_model: String,
    pub models: Vec<&'static str>,
}

fn default_question_type() -> String {
    prompts::DEFAULT_QUESTION_TYPE.to_string()
}

fn default_question_count() -> u32 {
    prompts::DEFAULT_QUESTION_COUNT
}

fn default_timeframe() -> String {
    prompts::DEFAULT_TIMEFRAME.to_string()
}

fn default_location() -> String {
    prompts::DEFAULT_LOCATION.to_string()
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(())
}

impl ChatRequest {
    fn options(&self) -> Result<AdviceOptions, AppError> {
        let mut options = AdviceOptions {
            model: self.model.clone(),
            ..AdviceOptions::default()
        };
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(AppError::Validation(
                    "'temperature' must be between 0.0 and 2.0".into(),
                ));
            }
            options.temperature = t;
        }
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(AppError::Validation("'max_tokens' must be at least 1".into()));
            }
            options.max_tokens = max_tokens;
        }
        Ok(options)
    }
}

/// Runs one non-streaming completion without recommendation context.
async fn complete(
    state: &AppState,
    prompt: String,
    max_tokens: u32,
    model: Option<String>,
) -> Result<Json<CoachReply>, AppError> {
    let chat = state.chat()?;
    let options = AdviceOptions {
        model,
        ..AdviceOptions::with_max_tokens(max_tokens)
    };
    let reply = chat.advise(&prompt, None, &options).await;
    Ok(Json(CoachReply {
        reply,
        model: options
            .model
            .unwrap_or_else(|| chat.default_model().to_string()),
    }))
}

/// POST /api/v1/coach/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<CoachReply>, AppError> {
    require_text("message", &req.message)?;
    let options = req.options()?;
    let chat = state.chat()?;

    let reply = chat
        .advise(&req.message, req.recommendations.as_ref(), &options)
        .await;
    Ok(Json(CoachReply {
        reply,
        model: options
            .model
            .unwrap_or_else(|| chat.default_model().to_string()),
    }))
}

/// POST /api/v1/coach/chat/stream
///
/// Each text delta is one SSE `data` event; a final `done` event closes the reply.
pub async fn handle_chat_stream(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    require_text("message", &req.message)?;
    let chat = state.chat()?;

    let deltas = chat.stream_advice(
        &req.message,
        req.recommendations.as_ref(),
        req.model.as_deref(),
    );
    let events = deltas
        // SSE cannot carry bare carriage returns
        .map(|chunk| Ok::<_, Infallible>(Event::default().data(chunk.replace('\r', ""))))
        .chain(stream::once(async {
            Ok::<_, Infallible>(Event::default().event("done").data("[DONE]"))
        }));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/coach/interview
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(req): Json<InterviewRequest>,
) -> Result<Json<CoachReply>, AppError> {
    require_text("career", &req.career)?;
    if req.count == 0 || req.count > MAX_QUESTION_COUNT {
        return Err(AppError::Validation(format!(
            "'count' must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }
    let prompt = prompts::interview_questions(&req.career, &req.question_type, req.count);
    complete(&state, prompt, prompts::INTERVIEW_MAX_TOKENS, req.model).await
}

/// POST /api/v1/coach/learning-plan
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    Json(req): Json<LearningPlanRequest>,
) -> Result<Json<CoachReply>, AppError> {
    require_text("current_role", &req.current_role)?;
    require_text("target_role", &req.target_role)?;
    let prompt = prompts::learning_plan(&req.current_role, &req.target_role, &req.timeframe);
    complete(&state, prompt, prompts::LEARNING_PLAN_MAX_TOKENS, req.model).await
}

/// POST /api/v1/coach/resume
pub async fn handle_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeRequest>,
) -> Result<Json<CoachReply>, AppError> {
    require_text("resume_text", &req.resume_text)?;
    require_text("target_role", &req.target_role)?;
    let prompt = prompts::resume_analysis(&req.resume_text, &req.target_role);
    complete(&state, prompt, prompts::RESUME_MAX_TOKENS, req.model).await
}

/// POST /api/v1/coach/salary-negotiation
pub async fn handle_salary_negotiation(
    State(state): State<AppState>,
    Json(req): Json<SalaryNegotiationRequest>,
) -> Result<Json<CoachReply>, AppError> {
    require_text("career", &req.career)?;
    require_text("offered_salary", &req.offered_salary)?;
    let prompt = prompts::salary_negotiation(
        &req.career,
        &req.offered_salary,
        req.experience_years,
        &req.location,
    );
    complete(&state, prompt, prompts::SALARY_MAX_TOKENS, req.model).await
}

/// GET /api/v1/coach/models
pub async fn handle_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let default_model = match &state.chat {
        Some(chat) => chat.default_model().to_string(),
        None => state.config.openrouter_model.clone(),
    };
    Json(ModelsResponse {
        default_model,
        models: AVAILABLE_MODELS.to_vec(),
    })
}
