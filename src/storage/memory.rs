//! In-memory `ExerciseStore` backend.

use crate::domain::leaderboard::{ensure_positive_points, rank_entries};
use crate::domain::{LeaderboardEntry, NewSession, SessionRecord};
use crate::storage::{new_id, ExerciseStore, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

/// One leaderboard entry behind its own lock, plus its insertion sequence for tie-breaks.
struct EntrySlot {
    seq: u64,
    entry: Mutex<LeaderboardEntry>,
}

/// Process-local store.
///
/// Sessions are an append-only log per username. Leaderboard entries each sit behind a
/// per-username mutex, so concurrent credits for the same user serialize while
/// different users proceed independently. The map write lock is only taken to create
/// an entry, and creation re-checks under that lock.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Vec<SessionRecord>>>,
    entries: RwLock<HashMap<String, Arc<EntrySlot>>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn existing_slot(&self, username: &str) -> Option<Arc<EntrySlot>> {
        self.entries.read().await.get(username).cloned()
    }
}

#[async_trait]
impl ExerciseStore for MemoryStore {
    #[instrument(skip(self, session), fields(username = %session.username, exercise = %session.exercise_type))]
    async fn create_session(&self, session: NewSession) -> StoreResult<SessionRecord> {
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(session.username.clone()).or_default();

        // Keep each user's log non-decreasing in time even if the wall clock steps back.
        let mut created_at = Utc::now();
        if let Some(last) = log.last() {
            created_at = created_at.max(last.created_at);
        }

        let record = session.into_record(new_id(), created_at);
        log.push(record.clone());
        debug!(session_id = %record.id, "session recorded");
        Ok(record)
    }

    async fn sessions_by_username(&self, username: &str) -> StoreResult<Vec<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(username)
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>> {
        let entries = self.entries.read().await;
        let mut snapshot = Vec::with_capacity(entries.len());
        for slot in entries.values() {
            let entry = slot.entry.lock().await.clone();
            snapshot.push((entry, slot.seq));
        }
        Ok(rank_entries(snapshot))
    }

    async fn leaderboard_entry(&self, username: &str) -> StoreResult<Option<LeaderboardEntry>> {
        match self.existing_slot(username).await {
            Some(slot) => Ok(Some(slot.entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn add_points(&self, username: &str, points_to_add: i64) -> StoreResult<LeaderboardEntry> {
        ensure_positive_points(points_to_add)?;

        let slot = match self.existing_slot(username).await {
            Some(slot) => slot,
            None => {
                let mut entries = self.entries.write().await;
                match entries.get(username).cloned() {
                    // Lost the creation race; credit the winner's entry below.
                    Some(slot) => slot,
                    None => {
                        let entry = LeaderboardEntry::first(
                            new_id(),
                            username.to_string(),
                            points_to_add,
                            Utc::now(),
                        );
                        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                        entries.insert(
                            username.to_string(),
                            Arc::new(EntrySlot {
                                seq,
                                entry: Mutex::new(entry.clone()),
                            }),
                        );
                        debug!(total_points = entry.total_points, "leaderboard entry created");
                        return Ok(entry);
                    }
                }
            }
        };

        let mut entry = slot.entry.lock().await;
        entry.credit(points_to_add, Utc::now())?;
        debug!(
            total_points = entry.total_points,
            exercises_completed = entry.exercises_completed,
            "leaderboard entry credited"
        );
        Ok(entry.clone())
    }
}
