//! The exercise coach service.
//!
//! Sits between the HTTP handlers, the vision gateway and the store. For every
//! completed validation it:
//! 1.  Normalizes the gateway's verdict (points floored and clamped, default texts).
//! 2.  Records a session, correct or not.
//! 3.  Credits the leaderboard only for a correct attempt that earned points.
//!
//! The two writes are independent: a failure between them leaves a recorded session
//! without leaderboard credit.

use crate::domain::{ExerciseType, NewSession};
use crate::infra::vision::{GatewayError, Judgement, ValidationGateway};
use crate::storage::{ExerciseStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

pub const DEFAULT_FEEDBACK: &str = "Keep practicing!";
pub const DEFAULT_ENCOURAGEMENT: &str = "You're doing great!";

#[derive(Debug, Error)]
pub enum CoachError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated request to judge one frame.
#[derive(Debug, Clone)]
pub struct ValidateExercise {
    pub username: String,
    pub exercise_type: ExerciseType,
    pub image_base64: String,
}

/// What the caller gets back after a validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_correct: bool,
    pub feedback: String,
    pub points_earned: u32,
    pub encouragement: String,
}

/// Clamps untrusted gateway output into a well-formed outcome.
///
/// Points are floored and clamped at 0; NaN and infinities count as 0.
pub fn normalize(judgement: Judgement) -> ValidationOutcome {
    let points = judgement.points_earned;
    let points_earned = if points.is_finite() && points > 0.0 {
        points.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    };

    let or_default = |text: String, default: &str| {
        if text.trim().is_empty() {
            default.to_string()
        } else {
            text
        }
    };

    ValidationOutcome {
        is_correct: judgement.is_correct,
        feedback: or_default(judgement.feedback, DEFAULT_FEEDBACK),
        points_earned,
        encouragement: or_default(judgement.encouragement, DEFAULT_ENCOURAGEMENT),
    }
}

pub struct CoachService {
    store: Arc<dyn ExerciseStore>,
    gateway: Arc<dyn ValidationGateway>,
}

impl CoachService {
    pub fn new(store: Arc<dyn ExerciseStore>, gateway: Arc<dyn ValidationGateway>) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &Arc<dyn ExerciseStore> {
        &self.store
    }

    #[instrument(skip(self, request), fields(username = %request.username, exercise = %request.exercise_type))]
    pub async fn validate_exercise(
        &self,
        request: ValidateExercise,
    ) -> Result<ValidationOutcome, CoachError> {
        let judgement = self
            .gateway
            .judge(request.exercise_type, &request.image_base64)
            .await
            .map_err(|e| {
                error!(error = %e, "vision gateway failed; nothing recorded");
                e
            })?;

        let outcome = normalize(judgement);

        self.store
            .create_session(NewSession {
                username: request.username.clone(),
                exercise_type: request.exercise_type,
                points_earned: outcome.points_earned,
                is_correct: outcome.is_correct,
                feedback: Some(outcome.feedback.clone()),
            })
            .await?;

        if outcome.is_correct && outcome.points_earned > 0 {
            let entry = self
                .store
                .add_points(&request.username, i64::from(outcome.points_earned))
                .await?;
            info!(
                points = outcome.points_earned,
                total_points = entry.total_points,
                "exercise credited"
            );
        } else {
            info!(is_correct = outcome.is_correct, "attempt recorded without credit");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Gateway that replays a fixed list of results.
    struct Scripted(Mutex<Vec<Result<Judgement, GatewayError>>>);

    impl Scripted {
        fn new(mut script: Vec<Result<Judgement, GatewayError>>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self(Mutex::new(script)))
        }
    }

    #[async_trait]
    impl ValidationGateway for Scripted {
        async fn judge(&self, _: ExerciseType, _: &str) -> Result<Judgement, GatewayError> {
            self.0
                .lock()
                .await
                .pop()
                .unwrap_or(Err(GatewayError::Transport("script exhausted".to_string())))
        }
    }

    fn judgement(is_correct: bool, points: f64) -> Judgement {
        Judgement {
            is_correct,
            feedback: String::new(),
            encouragement: String::new(),
            points_earned: points,
        }
    }

    fn request(username: &str) -> ValidateExercise {
        ValidateExercise {
            username: username.to_string(),
            exercise_type: ExerciseType::CrossCrawl,
            image_base64: "QUJD".to_string(),
        }
    }

    fn service(script: Vec<Result<Judgement, GatewayError>>) -> (Arc<MemoryStore>, CoachService) {
        let store = Arc::new(MemoryStore::new());
        let service = CoachService::new(store.clone(), Scripted::new(script));
        (store, service)
    }

    #[test]
    fn normalize_clamps_points_and_fills_texts() {
        assert_eq!(normalize(judgement(true, 7.9)).points_earned, 7);
        assert_eq!(normalize(judgement(true, -3.0)).points_earned, 0);
        assert_eq!(normalize(judgement(true, f64::NAN)).points_earned, 0);
        assert_eq!(normalize(judgement(true, f64::INFINITY)).points_earned, 0);

        let outcome = normalize(judgement(false, 0.0));
        assert_eq!(outcome.feedback, DEFAULT_FEEDBACK);
        assert_eq!(outcome.encouragement, DEFAULT_ENCOURAGEMENT);
    }

    #[tokio::test]
    async fn correct_attempt_records_session_and_credits_leaderboard() {
        let (store, service) = service(vec![Ok(judgement(true, 10.0)), Ok(judgement(true, 10.0))]);

        service.validate_exercise(request("amy")).await.unwrap();
        let outcome = service.validate_exercise(request("amy")).await.unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points_earned, 10);

        let sessions = store.sessions_by_username("amy").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].feedback.as_deref(), Some(DEFAULT_FEEDBACK));

        let amy = store.leaderboard_entry("amy").await.unwrap().unwrap();
        assert_eq!((amy.total_points, amy.exercises_completed), (20, 2));
    }

    #[tokio::test]
    async fn incorrect_or_pointless_attempts_are_recorded_but_not_credited() {
        let (store, service) = service(vec![Ok(judgement(false, 10.0)), Ok(judgement(true, 0.4))]);

        service.validate_exercise(request("amy")).await.unwrap();
        let outcome = service.validate_exercise(request("amy")).await.unwrap();
        assert_eq!(outcome.points_earned, 0);

        assert_eq!(store.sessions_by_username("amy").await.unwrap().len(), 2);
        assert!(store.leaderboard_entry("amy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gateway_failure_records_nothing() {
        let (store, service) = service(vec![Err(GatewayError::Timeout)]);

        let err = service.validate_exercise(request("amy")).await.unwrap_err();
        assert!(matches!(err, CoachError::Gateway(GatewayError::Timeout)));
        assert!(store.sessions_by_username("amy").await.unwrap().is_empty());
        assert!(store.leaderboard().await.unwrap().is_empty());
    }
}
