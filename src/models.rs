// ABOUTME: Persisted record types for linked Strava accounts and synced activities
// ABOUTME: Mirrors the athletes, links, and activities tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted data models.
//!
//! These map one-to-one onto the sqlite tables created by
//! [`crate::database::migrate`]. Transient provider response shapes live in
//! [`crate::providers::strava`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A Strava athlete whose account is linked to this application
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Athlete {
    /// Local row id
    pub id: i64,
    /// Strava's athlete id
    pub strava_id: i64,
    /// Strava username; athletes without one are keyed by their id string
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// Profile picture URL
    pub profile: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// OAuth token link between a local user and a Strava athlete
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Link {
    /// Local row id
    pub id: i64,
    /// Owning athlete's Strava id
    pub user_id: i64,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry as reported by the token exchange
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A synced Strava activity. Currently carries only distance, moving time,
/// elapsed time, type, name, and start dates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Strava's activity id (primary key, replace-on-sync)
    pub strava_id: i64,
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: i64,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    /// Sport type string as reported by Strava (`Run`, `Ride`, ...)
    pub activity_type: String,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    pub athlete_id: i64,
}
