// ABOUTME: Tests for the settings store implementations and the record store
// ABOUTME: Covers upsert/overwrite semantics and the re-auth replace and revoke flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::Utc;
use std::sync::Arc;
use strava_bridge::database::{
    self, records, MemorySettingsStore, SettingsStore, SqliteSettingsStore,
};
use strava_bridge::providers::strava::{
    ActivityAthleteRef, ActivitySummary, AthleteSummary, TokenExchangeResponse,
};
use tempfile::TempDir;

async fn test_pool() -> (sqlx::SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("bridge.db").display());
    let pool = database::connect(&url).await.unwrap();
    (pool, dir)
}

fn athlete_fixture() -> AthleteSummary {
    AthleteSummary {
        id: 4242,
        username: Some("runner".into()),
        firstname: Some("Road".into()),
        lastname: Some("Runner".into()),
        profile: None,
    }
}

fn token_fixture(access_token: &str) -> TokenExchangeResponse {
    TokenExchangeResponse {
        access_token: access_token.into(),
        refresh_token: Some("refresh-1".into()),
        expires_at: Utc::now().timestamp() + 21600,
        athlete: None,
    }
}

#[tokio::test]
async fn test_memory_store_upsert_and_overwrite() {
    let store = MemorySettingsStore::new();
    assert_eq!(store.get("strava-subscription").await.unwrap(), None);

    store.upsert("strava-subscription", "111").await.unwrap();
    assert_eq!(
        store.get("strava-subscription").await.unwrap().as_deref(),
        Some("111")
    );

    store.upsert("strava-subscription", "789").await.unwrap();
    assert_eq!(
        store.get("strava-subscription").await.unwrap().as_deref(),
        Some("789")
    );
}

#[tokio::test]
async fn test_sqlite_store_upsert_and_overwrite() {
    let (pool, _dir) = test_pool().await;
    let store = Arc::new(SqliteSettingsStore::new(pool));

    assert_eq!(store.get("strava-subscription").await.unwrap(), None);

    store.upsert("strava-subscription", "111").await.unwrap();
    store.upsert("strava-subscription", "789").await.unwrap();
    assert_eq!(
        store.get("strava-subscription").await.unwrap().as_deref(),
        Some("789")
    );

    // Other keys are untouched.
    assert_eq!(store.get("unrelated").await.unwrap(), None);
}

#[tokio::test]
async fn test_replace_athlete_link_overwrites_previous_authorization() {
    let (pool, _dir) = test_pool().await;
    let athlete = athlete_fixture();

    let username = records::replace_athlete_link(&pool, &athlete, &token_fixture("old-token"))
        .await
        .unwrap();
    assert_eq!(username, "runner");

    records::replace_athlete_link(&pool, &athlete, &token_fixture("new-token"))
        .await
        .unwrap();

    let link = records::find_link_by_username(&pool, "runner")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_token, "new-token");
    assert_eq!(link.user_id, 4242);

    let stored = records::find_athlete_by_username(&pool, "runner")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.strava_id, 4242);
    assert_eq!(stored.firstname.as_deref(), Some("Road"));
}

#[tokio::test]
async fn test_athlete_without_username_is_keyed_by_id() {
    let (pool, _dir) = test_pool().await;
    let athlete = AthleteSummary {
        username: None,
        ..athlete_fixture()
    };

    let username = records::replace_athlete_link(&pool, &athlete, &token_fixture("tok"))
        .await
        .unwrap();
    assert_eq!(username, "4242");
    assert!(records::find_link_by_username(&pool, "4242")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_delete_athlete_link_removes_both_records() {
    let (pool, _dir) = test_pool().await;
    records::replace_athlete_link(&pool, &athlete_fixture(), &token_fixture("tok"))
        .await
        .unwrap();

    records::delete_athlete_link(&pool, "runner").await.unwrap();

    assert!(records::find_link_by_username(&pool, "runner")
        .await
        .unwrap()
        .is_none());
    assert!(records::find_athlete_by_username(&pool, "runner")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_store_activities_replaces_by_strava_id() {
    let (pool, _dir) = test_pool().await;
    let now = Utc::now();
    let activity = ActivitySummary {
        id: 900,
        name: "Morning Run".into(),
        distance: 5012.3,
        moving_time: 1500,
        elapsed_time: 1620,
        activity_type: "Run".into(),
        start_date: now,
        start_date_local: now,
        athlete: Some(ActivityAthleteRef { id: 4242 }),
    };

    let written = records::store_activities(&pool, 4242, &[activity.clone()])
        .await
        .unwrap();
    assert_eq!(written, 1);

    // Re-syncing the same activity with a new name replaces the row.
    let renamed = ActivitySummary {
        name: "Morning Run (renamed)".into(),
        ..activity
    };
    records::store_activities(&pool, 4242, &[renamed])
        .await
        .unwrap();

    let stored = records::activities_for_athlete(&pool, 4242).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Morning Run (renamed)");
    assert_eq!(stored[0].moving_time, 1500);
}

#[tokio::test]
async fn test_store_activities_writes_whole_batch() {
    let (pool, _dir) = test_pool().await;
    let now = Utc::now();
    let batch: Vec<ActivitySummary> = (1..=3)
        .map(|i| ActivitySummary {
            id: 900 + i,
            name: format!("Ride {i}"),
            distance: 1000.0 * i as f64,
            moving_time: 600 * i,
            elapsed_time: 660 * i,
            activity_type: "Ride".into(),
            start_date: now,
            start_date_local: now,
            athlete: Some(ActivityAthleteRef { id: 4242 }),
        })
        .collect();

    // The batch commits as one transaction.
    let written = records::store_activities(&pool, 4242, &batch).await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(
        records::activities_for_athlete(&pool, 4242)
            .await
            .unwrap()
            .len(),
        3
    );
}
