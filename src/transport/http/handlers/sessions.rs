use crate::domain::NewSession;
use crate::transport::http::handlers::common::{json_rejection, server_error, store_failure, FieldChecks};
use crate::transport::http::types::{AppState, CreateSessionRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/sessions/{username}",
    params(
        ("username" = String, Path, description = "Exact username (case-sensitive)")
    ),
    responses(
        (status = 200, description = "Sessions for the user, newest first (empty if unknown)", body = Vec<crate::domain::SessionRecord>),
        (status = 500, description = "Store failure", body = crate::transport::http::types::ErrorResponse)
    )
)]
pub async fn list_sessions_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.store.sessions_by_username(&username).await {
        Ok(sessions) => (StatusCode::OK, Json(sessions)).into_response(),
        Err(e) => store_failure(e, "Failed to fetch sessions").into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session recorded", body = crate::domain::SessionRecord),
        (status = 400, description = "Invalid request data", body = crate::transport::http::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::transport::http::types::ErrorResponse)
    )
)]
pub async fn create_session_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_rejection(e).into_response(),
    };

    let mut checks = FieldChecks::new();
    let username = checks.non_empty_string("username", request.username.as_ref());
    let exercise_type = checks.exercise_type("exerciseType", request.exercise_type.as_ref());
    let points_earned = checks.integer_in(
        "pointsEarned",
        request.points_earned.as_ref(),
        0,
        i64::from(u32::MAX),
        "Points earned must be a non-negative integer",
    );
    let is_correct = checks.zero_or_one("isCorrect", request.is_correct.as_ref());
    let feedback = checks.optional_non_empty_string("feedback", request.feedback.as_ref());
    if let Err(resp) = checks.finish() {
        return resp.into_response();
    }
    let (Some(username), Some(exercise_type), Some(points_earned), Some(is_correct)) =
        (username, exercise_type, points_earned, is_correct)
    else {
        return server_error("Failed to create session").into_response();
    };
    let Ok(points_earned) = u32::try_from(points_earned) else {
        return server_error("Failed to create session").into_response();
    };

    match state
        .store
        .create_session(NewSession {
            username,
            exercise_type,
            points_earned,
            is_correct,
            feedback,
        })
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => store_failure(e, "Failed to create session").into_response(),
    }
}
