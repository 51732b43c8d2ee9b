//! Session and leaderboard repository.
//!
//! `ExerciseStore` is the contract every backend implements. Two backends exist:
//! - `MemoryStore`: process-local maps with per-username locking (dev and tests).
//! - `PostgresStore`: durable tables with a unique username constraint and an
//!   atomic upsert statement (production).
//!
//! Both must behave identically with respect to ordering, upsert accounting and
//! the positive-points precondition.

use crate::domain::{CreditError, LeaderboardEntry, NewSession, SessionRecord};
use crate::infra::config::{AppConfig, StoreBackend};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A caller broke an operation precondition (e.g. non-positive points).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row no longer decodes into the domain types.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<CreditError> for StoreError {
    fn from(err: CreditError) -> Self {
        StoreError::InvalidArgument(err.to_string())
    }
}

#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Appends one session with a fresh id and creation timestamp.
    ///
    /// No business validation happens here; the HTTP layer owns input checks.
    async fn create_session(&self, session: NewSession) -> StoreResult<SessionRecord>;

    /// Exact-match lookup, newest first. Unknown usernames yield an empty list.
    async fn sessions_by_username(&self, username: &str) -> StoreResult<Vec<SessionRecord>>;

    /// All entries, ranked by total points descending (see `domain::leaderboard::rank_order`).
    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>>;

    /// Exact-match, case-sensitive lookup.
    async fn leaderboard_entry(&self, username: &str) -> StoreResult<Option<LeaderboardEntry>>;

    /// Upsert keyed by username: creates the entry on first credit, otherwise adds
    /// `points_to_add` and counts one more completed exercise.
    ///
    /// Fails with `StoreError::InvalidArgument` when `points_to_add <= 0` or when the
    /// running total would overflow, leaving state untouched.
    async fn add_points(&self, username: &str, points_to_add: i64) -> StoreResult<LeaderboardEntry>;

    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Opens the backend selected by `STORE_BACKEND`.
pub async fn open_store(config: &AppConfig) -> StoreResult<Arc<dyn ExerciseStore>> {
    match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => {
            let store = PostgresStore::connect(url, config.database_max_connections).await?;
            Ok(Arc::new(store))
        }
        (StoreBackend::Postgres, None) => Err(StoreError::InvalidArgument(
            "DATABASE_URL is required for the postgres backend".to_string(),
        )),
        (StoreBackend::Memory, _) => Ok(Arc::new(MemoryStore::new())),
    }
}
