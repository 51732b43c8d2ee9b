//! Validation gateway: the remote vision model that judges an exercise frame.
//!
//! The core treats the gateway as untrusted. Whatever it returns is normalized by
//! `app::coach_service` before anything is recorded.

use crate::domain::ExerciseType;
use async_trait::async_trait;
use thiserror::Error;

pub mod client;

pub use client::OpenAiVisionGateway;

/// Raw verdict from the gateway. `points_earned` is not yet clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub is_correct: bool,
    pub feedback: String,
    pub encouragement: String,
    pub points_earned: f64,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("vision gateway is not configured: {0}")]
    NotConfigured(String),

    #[error("vision gateway timed out")]
    Timeout,

    #[error("vision gateway request failed: {0}")]
    Transport(String),

    #[error("vision gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("vision gateway returned unparseable content: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ValidationGateway: Send + Sync {
    /// Judges whether `image_base64` shows `exercise` performed correctly.
    async fn judge(
        &self,
        exercise: ExerciseType,
        image_base64: &str,
    ) -> Result<Judgement, GatewayError>;
}
