//! Domain types for the exercise coach: the exercise catalog, session records
//! and leaderboard entries.

pub mod exercise;
pub mod leaderboard;
pub mod session;

pub use exercise::{Exercise, ExerciseType, UnknownExerciseType};
pub use leaderboard::{CreditError, LeaderboardEntry, MAX_POINTS_PER_CREDIT};
pub use session::{NewSession, SessionRecord};
