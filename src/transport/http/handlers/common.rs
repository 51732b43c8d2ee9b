use crate::domain::ExerciseType;
use crate::storage::StoreError;
use crate::transport::http::types::{ErrorResponse, FieldError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value as JsonValue;
use tracing::error;

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub const INVALID_REQUEST: &str = "Invalid request data";

pub fn invalid_request(details: Vec<FieldError>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: INVALID_REQUEST.to_string(),
            details: Some(details),
        }),
    )
}

/// Malformed or non-JSON bodies are reported like any other validation failure.
pub fn json_rejection(err: JsonRejection) -> HandlerError {
    invalid_request(vec![FieldError {
        field: "<body>".to_string(),
        message: format!("Invalid JSON body: {}", err.body_text()),
    }])
}

pub fn server_error(message: &str) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
}

/// Maps a store failure: broken preconditions are the caller's fault, the rest is ours.
pub fn store_failure(err: StoreError, message: &str) -> HandlerError {
    match err {
        StoreError::InvalidArgument(reason) => invalid_request(vec![FieldError {
            field: "<request>".to_string(),
            message: reason,
        }]),
        other => {
            error!(error = %other, "{}", message);
            server_error(message)
        }
    }
}

/// Collects field-level validation errors for one request body.
#[derive(Default)]
pub struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn string<'a>(&mut self, field: &str, value: Option<&'a JsonValue>) -> Option<&'a str> {
        match value {
            None | Some(JsonValue::Null) => {
                self.fail(field, "Required");
                None
            }
            Some(JsonValue::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.fail(field, "Expected string");
                None
            }
        }
    }

    /// Required, non-empty string. Kept exactly as given (no trimming or case folding).
    pub fn non_empty_string(&mut self, field: &str, value: Option<&JsonValue>) -> Option<String> {
        let s = self.string(field, value)?;
        if s.is_empty() {
            self.fail(field, format!("{} is required", field));
            return None;
        }
        Some(s.to_string())
    }

    /// Optional string that must be non-empty when present.
    pub fn optional_non_empty_string(
        &mut self,
        field: &str,
        value: Option<&JsonValue>,
    ) -> Option<String> {
        match value {
            None | Some(JsonValue::Null) => None,
            present => self.non_empty_string(field, present),
        }
    }

    pub fn exercise_type(&mut self, field: &str, value: Option<&JsonValue>) -> Option<ExerciseType> {
        let s = self.string(field, value)?;
        match s.parse::<ExerciseType>() {
            Ok(t) => Some(t),
            Err(_) => {
                let allowed: Vec<&str> = ExerciseType::ALL.iter().map(|t| t.as_str()).collect();
                self.fail(
                    field,
                    format!("Invalid enum value. Expected one of: {}", allowed.join(", ")),
                );
                None
            }
        }
    }

    /// Integer within `[min, max]`. Whole-valued floats such as `5.0` are accepted.
    pub fn integer_in(
        &mut self,
        field: &str,
        value: Option<&JsonValue>,
        min: i64,
        max: i64,
        range_message: &str,
    ) -> Option<i64> {
        let n = match value {
            None | Some(JsonValue::Null) => {
                self.fail(field, "Required");
                return None;
            }
            Some(JsonValue::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            }),
            Some(_) => {
                self.fail(field, "Expected number");
                return None;
            }
        };
        match n {
            Some(n) if n >= min && n <= max => Some(n),
            Some(_) => {
                self.fail(field, range_message);
                None
            }
            None => {
                self.fail(field, "Expected integer");
                None
            }
        }
    }

    /// The persisted 0/1 correctness flag.
    pub fn zero_or_one(&mut self, field: &str, value: Option<&JsonValue>) -> Option<bool> {
        match value.and_then(JsonValue::as_i64) {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => {
                self.fail(field, format!("{} must be 0 or 1", field));
                None
            }
        }
    }

    /// Non-empty base64 payload; an optional `data:<mime>;base64,` prefix is stripped.
    pub fn base64_image(&mut self, field: &str, value: Option<&JsonValue>) -> Option<String> {
        let raw = self.string(field, value)?.trim();
        let payload = match raw.strip_prefix("data:") {
            Some(rest) => match rest.split_once(";base64,") {
                Some((_, data)) => data,
                None => {
                    self.fail(field, "Expected a base64 data URL");
                    return None;
                }
            },
            None => raw,
        };
        if payload.is_empty() {
            self.fail(field, "Image data is required");
            return None;
        }
        if STANDARD.decode(payload).is_err() {
            self.fail(field, "Image data must be base64 encoded");
            return None;
        }
        Some(payload.to_string())
    }

    pub fn finish(self) -> Result<(), HandlerError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(invalid_request(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields_of(checks: FieldChecks) -> Vec<String> {
        match checks.finish() {
            Ok(()) => Vec::new(),
            Err((_, Json(body))) => body
                .details
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.field)
                .collect(),
        }
    }

    #[test]
    fn collects_every_failing_field() {
        let mut checks = FieldChecks::new();
        assert!(checks.non_empty_string("username", Some(&json!(""))).is_none());
        assert!(checks.exercise_type("exerciseType", Some(&json!("jumping-jacks"))).is_none());
        assert!(checks
            .integer_in("pointsToAdd", Some(&json!(0)), 1, i64::MAX, "must be positive")
            .is_none());
        assert!(checks.zero_or_one("isCorrect", Some(&json!(true))).is_none());
        assert_eq!(
            fields_of(checks),
            vec!["username", "exerciseType", "pointsToAdd", "isCorrect"]
        );
    }

    #[test]
    fn accepts_well_formed_values() {
        let mut checks = FieldChecks::new();
        assert_eq!(
            checks.non_empty_string("username", Some(&json!(" Amy "))),
            Some(" Amy ".to_string())
        );
        assert_eq!(
            checks.exercise_type("exerciseType", Some(&json!("lazy-8s"))),
            Some(ExerciseType::Lazy8s)
        );
        assert_eq!(
            checks.integer_in("pointsEarned", Some(&json!(5.0)), 0, 10, "range"),
            Some(5)
        );
        assert_eq!(checks.zero_or_one("isCorrect", Some(&json!(1))), Some(true));
        assert_eq!(checks.optional_non_empty_string("feedback", None), None);
        assert!(fields_of(checks).is_empty());
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        let mut checks = FieldChecks::new();
        assert!(checks
            .integer_in("pointsToAdd", Some(&json!(2.5)), 1, i64::MAX, "range")
            .is_none());
        assert_eq!(fields_of(checks), vec!["pointsToAdd"]);
    }

    #[test]
    fn image_payload_must_be_base64() {
        let mut checks = FieldChecks::new();
        assert_eq!(
            checks.base64_image("imageData", Some(&json!("data:image/jpeg;base64,QUJD"))),
            Some("QUJD".to_string())
        );
        assert!(checks.base64_image("imageData", Some(&json!("not base64!"))).is_none());
        assert!(checks.base64_image("imageData", Some(&json!(""))).is_none());
        assert_eq!(fields_of(checks), vec!["imageData", "imageData"]);
    }
}
