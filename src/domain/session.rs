//! Exercise session records: one per validation attempt, never mutated.

use crate::domain::exercise::ExerciseType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A recorded attempt at an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub username: String,
    pub exercise_type: ExerciseType,
    pub points_earned: u32,
    /// Persisted and serialized as `0` / `1`.
    #[serde(with = "flag")]
    #[schema(value_type = i32, minimum = 0, maximum = 1)]
    pub is_correct: bool,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `create_session`: a record minus the store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub username: String,
    pub exercise_type: ExerciseType,
    pub points_earned: u32,
    pub is_correct: bool,
    pub feedback: Option<String>,
}

impl NewSession {
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            id,
            username: self.username,
            exercise_type: self.exercise_type,
            points_earned: self.points_earned,
            is_correct: self.is_correct,
            feedback: self.feedback,
            created_at,
        }
    }
}

/// `bool` <-> `0`/`1` integer mapping used by the session wire format.
pub mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn to_int(value: bool) -> i16 {
        i16::from(value)
    }

    pub fn from_int(value: i64) -> Option<bool> {
        match value {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(to_int(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        from_int(raw).ok_or_else(|| de::Error::custom("expected 0 or 1"))
    }
}
