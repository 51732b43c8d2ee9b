//! Contract test for the durable backend.
//!
//! Needs a disposable database: set `TEST_DATABASE_URL` (the tables are truncated).
//! Without it the test returns early.

use brain_gym_coach::{ExerciseStore, ExerciseType, NewSession, PostgresStore, StoreError};
use std::env;
use std::sync::Arc;

fn attempt(username: &str, exercise_type: ExerciseType, points: u32, correct: bool) -> NewSession {
    NewSession {
        username: username.to_string(),
        exercise_type,
        points_earned: points,
        is_correct: correct,
        feedback: correct.then(|| "Nice!".to_string()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_store_contract() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping postgres contract test");
        return Ok(());
    };

    let store = Arc::new(PostgresStore::connect(&url, 8).await?);
    store.clear().await?;
    store.ping().await?;

    // --- Upsert accounting ---
    let amy = store.add_points("amy", 10).await?;
    assert_eq!((amy.total_points, amy.exercises_completed), (10, 1));
    let amy2 = store.add_points("amy", 5).await?;
    assert_eq!((amy2.total_points, amy2.exercises_completed), (15, 2));
    assert_eq!(amy2.id, amy.id);
    assert_eq!(amy2.created_at, amy.created_at);
    store.add_points("ben", 20).await?;

    let board = store.leaderboard().await?;
    let summary: Vec<(&str, i64)> = board
        .iter()
        .map(|e| (e.username.as_str(), e.total_points))
        .collect();
    assert_eq!(summary, vec![("ben", 20), ("amy", 15)]);
    assert_eq!(store.leaderboard().await?, board);

    // --- Precondition ---
    for bad in [0, -5] {
        let err = store.add_points("amy", bad).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
    let amy3 = store.leaderboard_entry("amy").await?.unwrap();
    assert_eq!((amy3.total_points, amy3.exercises_completed), (15, 2));
    assert!(store.leaderboard_entry("Amy").await?.is_none());

    // --- Concurrent credits for one user ---
    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.add_points("cat", 2).await }));
    }
    for h in handles {
        h.await??;
    }
    let cat = store.leaderboard_entry("cat").await?.unwrap();
    assert_eq!((cat.total_points, cat.exercises_completed), (64, 32));

    // --- Overflowing total ---
    store.add_points("dan", i64::MAX).await?;
    let err = store.add_points("dan", 5).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
    let dan = store.leaderboard_entry("dan").await?.unwrap();
    assert_eq!((dan.total_points, dan.exercises_completed), (i64::MAX, 1));

    // --- Sessions ---
    let first = store
        .create_session(attempt("amy", ExerciseType::Lazy8s, 0, false))
        .await?;
    let second = store
        .create_session(attempt("amy", ExerciseType::EarthButtons, 10, true))
        .await?;
    assert!(!first.is_correct);
    assert_eq!(second.exercise_type, ExerciseType::EarthButtons);
    assert_eq!(second.feedback.as_deref(), Some("Nice!"));

    let listed = store.sessions_by_username("amy").await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert!(store.sessions_by_username("nobody").await?.is_empty());

    store.clear().await?;
    Ok(())
}
