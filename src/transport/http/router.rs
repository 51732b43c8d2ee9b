use crate::app::coach_service::ValidationOutcome;
use crate::domain::{ExerciseType, LeaderboardEntry, SessionRecord};
use crate::transport::http::handlers::{exercises, health, leaderboard, sessions};
use crate::transport::http::types::{
    AddPointsRequest, CreateSessionRequest, ErrorResponse, ExerciseInfo, FieldError,
    HealthResponse, ValidateExerciseRequest,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        exercises::list_exercises_handler,
        exercises::get_exercise_handler,
        exercises::validate_exercise_handler,
        leaderboard::get_leaderboard_handler,
        leaderboard::add_points_handler,
        sessions::list_sessions_handler,
        sessions::create_session_handler
    ),
    components(schemas(
        ExerciseType,
        ExerciseInfo,
        ValidateExerciseRequest,
        ValidationOutcome,
        CreateSessionRequest,
        SessionRecord,
        AddPointsRequest,
        LeaderboardEntry,
        ErrorResponse,
        FieldError,
        HealthResponse
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/exercises", get(exercises::list_exercises_handler))
        .route(
            "/api/exercises/validate",
            post(exercises::validate_exercise_handler),
        )
        .route("/api/exercises/:exercise_type", get(exercises::get_exercise_handler))
        .route(
            "/api/leaderboard",
            get(leaderboard::get_leaderboard_handler).post(leaderboard::add_points_handler),
        )
        .route("/api/sessions", post(sessions::create_session_handler))
        .route("/api/sessions/:username", get(sessions::list_sessions_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
