use crate::app::coach_service::{CoachError, ValidateExercise};
use crate::domain::ExerciseType;
use crate::transport::http::handlers::common::{json_rejection, server_error, store_failure, FieldChecks};
use crate::transport::http::types::{AppState, ErrorResponse, ExerciseInfo, ValidateExerciseRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/exercises",
    responses(
        (status = 200, description = "Exercise catalog", body = Vec<ExerciseInfo>)
    )
)]
pub async fn list_exercises_handler() -> Json<Vec<ExerciseInfo>> {
    Json(
        ExerciseType::ALL
            .iter()
            .map(|t| ExerciseInfo::from(t.info()))
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/api/exercises/{exercise_type}",
    params(
        ("exercise_type" = String, Path, description = "Exercise tag (e.g. lazy-8s)")
    ),
    responses(
        (status = 200, description = "Exercise details", body = ExerciseInfo),
        (status = 404, description = "Unknown exercise", body = ErrorResponse)
    )
)]
pub async fn get_exercise_handler(Path(exercise_type): Path<String>) -> impl IntoResponse {
    match exercise_type.parse::<ExerciseType>() {
        Ok(t) => (StatusCode::OK, Json(ExerciseInfo::from(t.info()))).into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
                details: None,
            }),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/exercises/validate",
    request_body = ValidateExerciseRequest,
    responses(
        (status = 200, description = "Frame judged; session recorded", body = crate::app::coach_service::ValidationOutcome),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Vision gateway or store failure", body = ErrorResponse)
    )
)]
pub async fn validate_exercise_handler(
    State(state): State<AppState>,
    request: Result<Json<ValidateExerciseRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_rejection(e).into_response(),
    };

    let mut checks = FieldChecks::new();
    let exercise_type = checks.exercise_type("exerciseType", request.exercise_type.as_ref());
    let image_base64 = checks.base64_image("imageData", request.image_data.as_ref());
    let username = checks.non_empty_string("username", request.username.as_ref());
    if let Err(resp) = checks.finish() {
        return resp.into_response();
    }
    let (Some(exercise_type), Some(image_base64), Some(username)) =
        (exercise_type, image_base64, username)
    else {
        return server_error("Failed to validate exercise").into_response();
    };

    match state
        .coach
        .validate_exercise(ValidateExercise {
            username,
            exercise_type,
            image_base64,
        })
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(CoachError::Gateway(_)) => server_error("Failed to validate exercise").into_response(),
        Err(CoachError::Store(e)) => store_failure(e, "Failed to validate exercise").into_response(),
    }
}
