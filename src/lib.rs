pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::coach_service::{CoachError, CoachService, ValidateExercise, ValidationOutcome};
pub use domain::{ExerciseType, LeaderboardEntry, NewSession, SessionRecord};
pub use infra::config::{AppConfig, StoreBackend};
pub use infra::vision::{GatewayError, Judgement, OpenAiVisionGateway, ValidationGateway};
pub use storage::{ExerciseStore, MemoryStore, PostgresStore, StoreError};
