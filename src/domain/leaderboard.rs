//! Per-user running totals and the ranking rule shared by every store backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;
use utoipa::ToSchema;

/// Largest amount a single credit may carry (the range of a 32-bit points column).
pub const MAX_POINTS_PER_CREDIT: i64 = i32::MAX as i64;

/// A credit the leaderboard refuses to apply. State is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    #[error("points must be greater than 0 to update leaderboard (got {0})")]
    NonPositive(i64),

    #[error("adding {points} points would overflow the running total")]
    Overflow { points: i64 },
}

/// Leaderboard row for a single username.
///
/// `total_points` and `exercises_completed` only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub total_points: i64,
    pub exercises_completed: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// First credit for a username.
    pub fn first(id: String, username: String, points: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            total_points: points,
            exercises_completed: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies one credited exercise. `updated_at` never moves backwards.
    pub fn credit(&mut self, points: i64, now: DateTime<Utc>) -> Result<(), CreditError> {
        let (Some(total_points), Some(exercises_completed)) = (
            self.total_points.checked_add(points),
            self.exercises_completed.checked_add(1),
        ) else {
            return Err(CreditError::Overflow { points });
        };
        self.total_points = total_points;
        self.exercises_completed = exercises_completed;
        self.updated_at = now.max(self.updated_at);
        Ok(())
    }
}

/// Upserts only accept strictly positive point amounts.
pub fn ensure_positive_points(points_to_add: i64) -> Result<(), CreditError> {
    if points_to_add <= 0 {
        return Err(CreditError::NonPositive(points_to_add));
    }
    Ok(())
}

/// Leaderboard order: points descending, then earliest `created_at`, then insertion sequence.
pub fn rank_order(a: (&LeaderboardEntry, u64), b: (&LeaderboardEntry, u64)) -> Ordering {
    b.0.total_points
        .cmp(&a.0.total_points)
        .then_with(|| a.0.created_at.cmp(&b.0.created_at))
        .then_with(|| a.1.cmp(&b.1))
}

/// Sorts `(entry, insertion_seq)` pairs into leaderboard order and drops the sequence.
pub fn rank_entries(mut entries: Vec<(LeaderboardEntry, u64)>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| rank_order((&a.0, a.1), (&b.0, b.1)));
    entries.into_iter().map(|(entry, _)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(name: &str, points: i64, created_at: DateTime<Utc>) -> LeaderboardEntry {
        LeaderboardEntry::first(format!("id-{}", name), name.to_string(), points, created_at)
    }

    #[test]
    fn non_positive_points_are_rejected() {
        assert_eq!(ensure_positive_points(0), Err(CreditError::NonPositive(0)));
        assert_eq!(ensure_positive_points(-5), Err(CreditError::NonPositive(-5)));
        assert!(ensure_positive_points(1).is_ok());
    }

    #[test]
    fn credit_accumulates_and_counts_once_per_call() {
        let t0 = Utc::now();
        let mut e = entry("amy", 10, t0);
        e.credit(5, t0 + Duration::seconds(1)).unwrap();
        e.credit(100, t0 + Duration::seconds(2)).unwrap();
        assert_eq!(e.total_points, 115);
        assert_eq!(e.exercises_completed, 3);
        assert_eq!(e.created_at, t0);
        assert_eq!(e.updated_at, t0 + Duration::seconds(2));
    }

    #[test]
    fn overflowing_credit_leaves_entry_untouched() {
        let t0 = Utc::now();
        let mut e = entry("amy", i64::MAX, t0);
        let before = e.clone();
        assert_eq!(
            e.credit(5, t0 + Duration::seconds(1)),
            Err(CreditError::Overflow { points: 5 })
        );
        assert_eq!(e, before);
    }

    #[test]
    fn ranking_is_independent_of_input_order() {
        let t0 = Utc::now();
        let a = (entry("amy", 15, t0), 0);
        let b = (entry("ben", 20, t0 + Duration::seconds(1)), 1);
        let c = (entry("cat", 15, t0 + Duration::seconds(2)), 2);

        let forward = rank_entries(vec![a.clone(), b.clone(), c.clone()]);
        let backward = rank_entries(vec![c, b, a]);
        assert_eq!(forward, backward);

        let names: Vec<&str> = forward.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["ben", "amy", "cat"]);
    }

    #[test]
    fn equal_points_and_timestamps_fall_back_to_insertion_order() {
        let t0 = Utc::now();
        let ranked = rank_entries(vec![(entry("zed", 5, t0), 7), (entry("abe", 5, t0), 3)]);
        assert_eq!(ranked[0].username, "abe");
        assert_eq!(ranked[1].username, "zed");
    }
}
