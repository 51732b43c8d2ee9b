use crate::app::coach_service::CoachService;
use crate::domain::{Exercise, ExerciseType};
use crate::storage::ExerciseStore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared handler state. Built once at startup and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExerciseStore>,
    pub coach: Arc<CoachService>,
}

impl AppState {
    pub fn new(coach: CoachService) -> Self {
        Self {
            store: coach.store().clone(),
            coach: Arc::new(coach),
        }
    }
}

// Request bodies are decoded leniently (every field optional, any JSON type) so that
// validation can report all problems at once instead of failing on the first one.

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateExerciseRequest {
    #[serde(default)]
    #[schema(value_type = ExerciseType)]
    pub exercise_type: Option<JsonValue>,
    /// Base64-encoded JPEG frame. A `data:<mime>;base64,` prefix is tolerated.
    #[serde(default)]
    #[schema(value_type = String)]
    pub image_data: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = String, min_length = 1)]
    pub username: Option<JsonValue>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    #[schema(value_type = String, min_length = 1)]
    pub username: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = ExerciseType)]
    pub exercise_type: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = i64, minimum = 0)]
    pub points_earned: Option<JsonValue>,
    /// `0` or `1`.
    #[serde(default)]
    #[schema(value_type = i32, minimum = 0, maximum = 1)]
    pub is_correct: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub feedback: Option<JsonValue>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPointsRequest {
    #[serde(default)]
    #[schema(value_type = String, min_length = 1)]
    pub username: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = i64, minimum = 1)]
    pub points_to_add: Option<JsonValue>,
}

/// One field that failed validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Catalog entry as served to the UI.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ExerciseInfo {
    pub id: ExerciseType,
    pub name: String,
    pub description: String,
    pub instructions: Vec<String>,
    pub benefits: String,
    pub icon: String,
}

impl From<&Exercise> for ExerciseInfo {
    fn from(e: &Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name.to_string(),
            description: e.description.to_string(),
            instructions: e.instructions.iter().map(|s| s.to_string()).collect(),
            benefits: e.benefits.to_string(),
            icon: e.icon.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
