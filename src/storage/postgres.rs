//! Durable `ExerciseStore` backend on PostgreSQL.

use crate::domain::leaderboard::ensure_positive_points;
use crate::domain::session::flag;
use crate::domain::{CreditError, ExerciseType, LeaderboardEntry, NewSession, SessionRecord};
use crate::storage::{new_id, ExerciseStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

const LEADERBOARD_COLUMNS: &str =
    "id, username, total_points, exercises_completed, created_at, updated_at";
const SESSION_COLUMNS: &str =
    "id, username, exercise_type, points_earned, is_correct, feedback, created_at";

// SQLSTATE raised when `total_points + $3` leaves the BIGINT range.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// A store backed by a PostgreSQL connection pool.
///
/// `leaderboard_entries.username` is UNIQUE and credits go through a single
/// `INSERT ... ON CONFLICT DO UPDATE` statement, so concurrent credits for one user
/// are serialized by the database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects and makes sure the tables exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Self::new_with_pool(pool).await
    }

    pub async fn new_with_pool(pool: PgPool) -> StoreResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS leaderboard_entries (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                total_points BIGINT NOT NULL DEFAULT 0,
                exercises_completed BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                seq BIGSERIAL
            )",
        )
        .execute(&pool)
        .await?;

        // `seq` breaks ties between sessions created within the same timestamp tick.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS exercise_sessions (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                exercise_type TEXT NOT NULL,
                points_earned BIGINT NOT NULL CHECK (points_earned >= 0),
                is_correct SMALLINT NOT NULL CHECK (is_correct IN (0, 1)),
                feedback TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                seq BIGSERIAL
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS exercise_sessions_username_idx
             ON exercise_sessions (username, created_at DESC, seq DESC)",
        )
        .execute(&pool)
        .await?;

        info!("postgres store ready (leaderboard_entries, exercise_sessions)");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Removes every row. Only meant for test setup.
    pub async fn clear(&self) -> StoreResult<()> {
        sqlx::query("TRUNCATE TABLE exercise_sessions, leaderboard_entries")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn entry_from_row(row: &PgRow) -> StoreResult<LeaderboardEntry> {
    Ok(LeaderboardEntry {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        total_points: row.try_get("total_points")?,
        exercises_completed: row.try_get("exercises_completed")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn session_from_row(row: &PgRow) -> StoreResult<SessionRecord> {
    let id: String = row.try_get("id")?;
    let exercise_tag: String = row.try_get("exercise_type")?;
    let exercise_type = exercise_tag
        .parse::<ExerciseType>()
        .map_err(|e| StoreError::Corrupt(format!("session {}: {}", id, e)))?;
    let points: i64 = row.try_get("points_earned")?;
    let points_earned = u32::try_from(points)
        .map_err(|_| StoreError::Corrupt(format!("session {}: points_earned {}", id, points)))?;
    let is_correct_raw: i16 = row.try_get("is_correct")?;
    let is_correct = flag::from_int(i64::from(is_correct_raw)).ok_or_else(|| {
        StoreError::Corrupt(format!("session {}: is_correct {}", id, is_correct_raw))
    })?;

    Ok(SessionRecord {
        username: row.try_get("username")?,
        exercise_type,
        points_earned,
        is_correct,
        feedback: row.try_get("feedback")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        id,
    })
}

#[async_trait]
impl ExerciseStore for PostgresStore {
    #[instrument(skip(self, session), fields(username = %session.username, exercise = %session.exercise_type))]
    async fn create_session(&self, session: NewSession) -> StoreResult<SessionRecord> {
        let sql = format!(
            "INSERT INTO exercise_sessions
                (id, username, exercise_type, points_earned, is_correct, feedback)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            SESSION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(new_id())
            .bind(&session.username)
            .bind(session.exercise_type.as_str())
            .bind(i64::from(session.points_earned))
            .bind(flag::to_int(session.is_correct))
            .bind(&session.feedback)
            .fetch_one(&self.pool)
            .await?;
        let record = session_from_row(&row)?;
        debug!(session_id = %record.id, "session recorded");
        Ok(record)
    }

    async fn sessions_by_username(&self, username: &str) -> StoreResult<Vec<SessionRecord>> {
        let sql = format!(
            "SELECT {} FROM exercise_sessions
             WHERE username = $1
             ORDER BY created_at DESC, seq DESC",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(session_from_row).collect()
    }

    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT {} FROM leaderboard_entries
             ORDER BY total_points DESC, created_at ASC, seq ASC",
            LEADERBOARD_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn leaderboard_entry(&self, username: &str) -> StoreResult<Option<LeaderboardEntry>> {
        let sql = format!(
            "SELECT {} FROM leaderboard_entries WHERE username = $1",
            LEADERBOARD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(entry_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn add_points(&self, username: &str, points_to_add: i64) -> StoreResult<LeaderboardEntry> {
        ensure_positive_points(points_to_add)?;

        let sql = format!(
            "INSERT INTO leaderboard_entries
                (id, username, total_points, exercises_completed, created_at, updated_at)
             VALUES ($1, $2, $3, 1, now(), now())
             ON CONFLICT (username) DO UPDATE SET
                total_points = leaderboard_entries.total_points + EXCLUDED.total_points,
                exercises_completed = leaderboard_entries.exercises_completed + 1,
                updated_at = GREATEST(leaderboard_entries.updated_at, EXCLUDED.updated_at)
             RETURNING {}",
            LEADERBOARD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(new_id())
            .bind(username)
            .bind(points_to_add)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
                    StoreError::from(CreditError::Overflow {
                        points: points_to_add,
                    })
                }
                other => StoreError::Database(other),
            })?;
        let entry = entry_from_row(&row)?;
        debug!(
            total_points = entry.total_points,
            exercises_completed = entry.exercises_completed,
            "leaderboard entry credited"
        );
        Ok(entry)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
