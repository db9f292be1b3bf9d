// src/routes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::constants::{SCORE_MAX, SCORE_MIN};
use crate::models::{AppState, Classroom, DashboardSnapshot, RecommendationResult, ScheduleEvent};
use crate::{dashboard, engine, repository};

pub type SharedState = Arc<AppState>;

/// Creates the API router. The UI is served from another origin, so CORS
/// stays permissive.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/topics", get(get_topics))
        .route("/api/execute", post(execute_code))
        .route("/api/quiz", post(generate_quiz))
        .route("/api/progress/:username", get(get_progress).post(post_progress))
        .route("/api/progress/:username/chapters", post(post_chapter_complete))
        .route("/api/activity/:username", post(post_activity))
        .route("/api/recommend/:username", get(get_recommendations))
        .route("/api/dashboard/:username", get(get_dashboard))
        .route("/api/classrooms", get(get_classrooms))
        .route("/api/schedule", get(get_schedule))
        .route("/api/chapters/:topic", get(get_chapters))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// --- Errors ---

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("storage unavailable")]
    Storage(#[from] rusqlite::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(e) = &self {
            error!("Storage error: {}", e);
        }
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

// --- Catalog Reads ---

#[derive(Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub description: String,
    pub difficulty: i64,
}

#[derive(Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<TopicSummary>,
}

/// GET /api/topics
pub async fn get_topics(State(state): State<SharedState>) -> Json<TopicsResponse> {
    let topics = state
        .catalog
        .all()
        .iter()
        .map(|t| TopicSummary {
            name: t.name.clone(),
            description: t.description.clone(),
            difficulty: t.difficulty,
        })
        .collect();
    Json(TopicsResponse { topics })
}

#[derive(Serialize)]
pub struct ChaptersResponse {
    pub topic: String,
    pub chapters: Vec<String>,
}

/// GET /api/chapters/:topic
pub async fn get_chapters(
    State(state): State<SharedState>,
    Path(topic): Path<String>,
) -> Result<Json<ChaptersResponse>, ApiError> {
    let found = state
        .catalog
        .get(&topic)
        .ok_or_else(|| ApiError::NotFound(format!("unknown topic '{}'", topic)))?;
    Ok(Json(ChaptersResponse {
        topic: found.name.clone(),
        chapters: found.chapters.clone(),
    }))
}

// --- Progress Reads ---

#[derive(Serialize)]
pub struct ProgressEntry {
    pub topic: String,
    pub score: f64,
}

#[derive(Serialize)]
pub struct ProgressResponse {
    pub username: String,
    pub progress: Vec<ProgressEntry>,
}

/// GET /api/progress/:username — raw scores, mastered topics included.
pub async fn get_progress(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let conn = state.db.lock().unwrap();
    let scores = repository::get_scores(&conn, &username)?;

    // Catalog order keeps repeated reads byte-identical.
    let progress = state
        .catalog
        .all()
        .iter()
        .filter_map(|t| {
            scores.get(&t.name).map(|score| ProgressEntry {
                topic: t.name.clone(),
                score: *score,
            })
        })
        .collect();
    Ok(Json(ProgressResponse { username, progress }))
}

/// GET /api/recommend/:username
pub async fn get_recommendations(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let conn = state.db.lock().unwrap();
    let result = engine::recommend_for(&conn, &state.catalog, &username, state.mastery_threshold)?;
    Ok(Json(result))
}

/// GET /api/dashboard/:username
pub async fn get_dashboard(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let today = Utc::now().date_naive();
    let conn = state.db.lock().unwrap();
    let snapshot = dashboard::snapshot(&conn, &state.catalog, &username, today)?;
    Ok(Json(snapshot))
}

// --- Progress Writes (ingestion boundary) ---

#[derive(Deserialize)]
pub struct ScoreUpdate {
    pub topic: String,
    pub score: f64,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/progress/:username
pub async fn post_progress(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(update): Json<ScoreUpdate>,
) -> Result<Json<UpdateResponse>, ApiError> {
    if !(SCORE_MIN..=SCORE_MAX).contains(&update.score) {
        return Err(ApiError::Validation(format!(
            "score {} outside [0,1]",
            update.score
        )));
    }
    if state.catalog.get(&update.topic).is_none() {
        return Err(ApiError::Validation(format!(
            "unknown topic '{}'",
            update.topic
        )));
    }

    let conn = state.db.lock().unwrap();
    repository::upsert_score(&conn, &username, &update.topic, update.score)?;
    info!("Score update: {} {} -> {}", username, update.topic, update.score);
    Ok(Json(UpdateResponse {
        success: true,
        message: format!("Recorded {} = {}", update.topic, update.score),
    }))
}

#[derive(Deserialize)]
pub struct ActivityReport {
    pub kind: String,
    pub minutes: i64,
}

/// POST /api/activity/:username
pub async fn post_activity(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(report): Json<ActivityReport>,
) -> Result<Json<UpdateResponse>, ApiError> {
    if report.minutes < 0 {
        return Err(ApiError::Validation(format!(
            "minutes {} is negative",
            report.minutes
        )));
    }

    let now = Utc::now().timestamp();
    let conn = state.db.lock().unwrap();
    repository::append_activity(&conn, &username, &report.kind, report.minutes, now)?;
    info!(
        "Activity: {} logged {} min of {}",
        username, report.minutes, report.kind
    );
    Ok(Json(UpdateResponse {
        success: true,
        message: format!("Logged {} minutes", report.minutes),
    }))
}

#[derive(Deserialize)]
pub struct ChapterComplete {
    pub topic: String,
}

/// POST /api/progress/:username/chapters
pub async fn post_chapter_complete(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(req): Json<ChapterComplete>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let topic = state
        .catalog
        .get(&req.topic)
        .ok_or_else(|| ApiError::Validation(format!("unknown topic '{}'", req.topic)))?;

    let total = topic.chapters.len() as i64;
    let conn = state.db.lock().unwrap();
    let completed = repository::increment_chapter(&conn, &username, &topic.name, total)?;
    info!(
        "Chapter complete: {} at {}/{} in {}",
        username, completed, total, topic.name
    );
    Ok(Json(UpdateResponse {
        success: true,
        message: format!("{}/{} chapters complete", completed, total),
    }))
}

// --- Registry Reads ---

#[derive(Serialize)]
pub struct ClassroomsResponse {
    pub classrooms: Vec<Classroom>,
}

/// GET /api/classrooms
pub async fn get_classrooms(
    State(state): State<SharedState>,
) -> Result<Json<ClassroomsResponse>, ApiError> {
    let conn = state.db.lock().unwrap();
    let classrooms = repository::list_classrooms(&conn)?;
    Ok(Json(ClassroomsResponse { classrooms }))
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub schedule: Vec<ScheduleEvent>,
}

/// GET /api/schedule
pub async fn get_schedule(
    State(state): State<SharedState>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let conn = state.db.lock().unwrap();
    let schedule = repository::list_schedule(&conn)?;
    Ok(Json(ScheduleResponse { schedule }))
}

// --- Collaborator Stubs ---

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub output: String,
}

/// POST /api/execute — stands in for the execution service; echoes the
/// submitted code the way the surrounding platform's placeholder did.
pub async fn execute_code(Json(req): Json<CodeRequest>) -> Json<ExecuteResponse> {
    Json(ExecuteResponse {
        success: true,
        output: format!("Code received:\n{}", req.code),
    })
}

fn default_quiz_difficulty() -> i64 {
    2
}

#[derive(Deserialize)]
pub struct QuizRequest {
    pub topic_name: String,
    #[serde(default = "default_quiz_difficulty")]
    pub difficulty: i64,
}

#[derive(Serialize)]
pub struct QuizResponse {
    pub topic: String,
    pub quiz: String,
}

/// POST /api/quiz — stands in for the quiz-generation service.
pub async fn generate_quiz(
    State(state): State<SharedState>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let topic = state
        .catalog
        .get(&req.topic_name)
        .ok_or_else(|| ApiError::NotFound(format!("unknown topic '{}'", req.topic_name)))?;

    let quiz = format!(
        "Sample quiz for {} (difficulty {})\n\nQuestion: What is {}?\nA) Option 1\nB) Option 2\nC) Option 3\nD) Option 4",
        topic.name, req.difficulty, topic.description
    );
    Ok(Json(QuizResponse {
        topic: topic.name.clone(),
        quiz,
    }))
}
