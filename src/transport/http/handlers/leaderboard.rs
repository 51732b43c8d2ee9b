use crate::domain::MAX_POINTS_PER_CREDIT;
use crate::transport::http::handlers::common::{json_rejection, server_error, store_failure, FieldChecks};
use crate::transport::http::types::{AddPointsRequest, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Entries by total points descending; ties go to the earliest entry", body = Vec<crate::domain::LeaderboardEntry>),
        (status = 500, description = "Store failure", body = crate::transport::http::types::ErrorResponse)
    )
)]
pub async fn get_leaderboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.leaderboard().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => store_failure(e, "Failed to fetch leaderboard").into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/leaderboard",
    request_body = AddPointsRequest,
    responses(
        (status = 200, description = "Entry created or credited", body = crate::domain::LeaderboardEntry),
        (status = 400, description = "Invalid request data", body = crate::transport::http::types::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::transport::http::types::ErrorResponse)
    )
)]
pub async fn add_points_handler(
    State(state): State<AppState>,
    request: Result<Json<AddPointsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_rejection(e).into_response(),
    };

    let mut checks = FieldChecks::new();
    let username = checks.non_empty_string("username", request.username.as_ref());
    let points_to_add = checks.integer_in(
        "pointsToAdd",
        request.points_to_add.as_ref(),
        1,
        MAX_POINTS_PER_CREDIT,
        "Points must be a positive integer no greater than 2147483647",
    );
    if let Err(resp) = checks.finish() {
        return resp.into_response();
    }
    let (Some(username), Some(points_to_add)) = (username, points_to_add) else {
        return server_error("Failed to update leaderboard").into_response();
    };

    match state.store.add_points(&username, points_to_add).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => store_failure(e, "Failed to update leaderboard").into_response(),
    }
}
