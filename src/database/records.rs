// ABOUTME: Athlete, link, and activity record operations
// ABOUTME: Re-auth replaces existing rows; revoke deletes athlete and link together
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store for linked accounts and synced activities.

use crate::errors::BridgeResult;
use crate::models::{Activity, Athlete, Link};
use crate::providers::strava::{ActivitySummary, AthleteSummary, TokenExchangeResponse};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Username used to key the athlete and link rows. Athletes without a public
/// username fall back to their numeric Strava id.
#[must_use]
pub fn link_username(athlete: &AthleteSummary) -> String {
    athlete
        .username
        .clone()
        .unwrap_or_else(|| athlete.id.to_string())
}

/// Store the athlete and token link from a completed OAuth exchange,
/// replacing any rows from an earlier authorization of the same account.
///
/// # Errors
///
/// Returns a database error if the transaction fails.
pub async fn replace_athlete_link(
    pool: &SqlitePool,
    athlete: &AthleteSummary,
    token: &TokenExchangeResponse,
) -> BridgeResult<String> {
    let username = link_username(athlete);
    let now = Utc::now();
    let expires_at = DateTime::<Utc>::from_timestamp(token.expires_at, 0).unwrap_or(now);

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM links WHERE username = ?1")
        .bind(&username)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM athletes WHERE username = ?1")
        .bind(&username)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO athletes (strava_id, username, firstname, lastname, profile, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(athlete.id)
    .bind(&username)
    .bind(&athlete.firstname)
    .bind(&athlete.lastname)
    .bind(&athlete.profile)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO links (user_id, username, access_token, refresh_token, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(athlete.id)
    .bind(&username)
    .bind(&token.access_token)
    .bind(token.refresh_token.as_deref().unwrap_or_default())
    .bind(expires_at)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(username)
}

/// Look up the token link for a username.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_link_by_username(
    pool: &SqlitePool,
    username: &str,
) -> BridgeResult<Option<Link>> {
    let link = sqlx::query_as::<_, Link>("SELECT * FROM links WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(link)
}

/// Look up a stored athlete by username.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_athlete_by_username(
    pool: &SqlitePool,
    username: &str,
) -> BridgeResult<Option<Athlete>> {
    let athlete = sqlx::query_as::<_, Athlete>("SELECT * FROM athletes WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(athlete)
}

/// Remove the athlete and link rows after a successful revocation.
///
/// # Errors
///
/// Returns a database error if the transaction fails.
pub async fn delete_athlete_link(pool: &SqlitePool, username: &str) -> BridgeResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM links WHERE username = ?1")
        .bind(username)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM athletes WHERE username = ?1")
        .bind(username)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Store fetched activities, replacing earlier copies by Strava activity id.
/// Runs in one transaction so a failed sync writes nothing. Returns the
/// number of rows written.
///
/// # Errors
///
/// Returns a database error if any insert fails; no rows are kept in that case.
pub async fn store_activities(
    pool: &SqlitePool,
    athlete_id: i64,
    activities: &[ActivitySummary],
) -> BridgeResult<usize> {
    let mut tx = pool.begin().await?;
    let mut written = 0;
    for activity in activities {
        let owner = activity.athlete.as_ref().map_or(athlete_id, |a| a.id);
        sqlx::query(
            "INSERT OR REPLACE INTO activities
             (strava_id, name, distance, moving_time, elapsed_time, activity_type,
              start_date, start_date_local, athlete_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(activity.id)
        .bind(&activity.name)
        .bind(activity.distance)
        .bind(activity.moving_time)
        .bind(activity.elapsed_time)
        .bind(&activity.activity_type)
        .bind(activity.start_date)
        .bind(activity.start_date_local)
        .bind(owner)
        .execute(&mut *tx)
        .await?;
        written += 1;
    }
    tx.commit().await?;
    Ok(written)
}

/// Stored activities for an athlete, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn activities_for_athlete(
    pool: &SqlitePool,
    athlete_id: i64,
) -> BridgeResult<Vec<Activity>> {
    let activities = sqlx::query_as::<_, Activity>(
        "SELECT * FROM activities WHERE athlete_id = ?1 ORDER BY start_date DESC",
    )
    .bind(athlete_id)
    .fetch_all(pool)
    .await?;
    Ok(activities)
}
