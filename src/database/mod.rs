// ABOUTME: Database access layer - pool construction, schema migration, stores
// ABOUTME: Exposes the settings key-value store and athlete/link/activity records
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database layer built on sqlx/sqlite.

use crate::errors::BridgeResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Athlete, link, and activity record operations
pub mod records;
/// Key-value settings store used for the subscription slot
pub mod settings;

pub use settings::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};

/// Open (creating if missing) the sqlite database and run migrations.
///
/// # Errors
///
/// Returns a database error if the URL is malformed, the file cannot be
/// created, or migration statements fail.
pub async fn connect(database_url: &str) -> BridgeResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;
    info!("database ready: {database_url}");
    Ok(pool)
}

/// Create the schema if it does not exist yet.
///
/// # Errors
///
/// Returns a database error if any DDL statement fails.
pub async fn migrate(pool: &SqlitePool) -> BridgeResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS athletes (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            strava_id  INTEGER NOT NULL,
            username   TEXT NOT NULL,
            firstname  TEXT,
            lastname   TEXT,
            profile    TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS links (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL,
            username      TEXT NOT NULL,
            access_token  TEXT NOT NULL,
            refresh_token TEXT NOT NULL,
            expires_at    TEXT NOT NULL,
            created_at    TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS activities (
            strava_id        INTEGER PRIMARY KEY,
            name             TEXT NOT NULL,
            distance         REAL NOT NULL,
            moving_time      INTEGER NOT NULL,
            elapsed_time     INTEGER NOT NULL,
            activity_type    TEXT NOT NULL,
            start_date       TEXT NOT NULL,
            start_date_local TEXT NOT NULL,
            athlete_id       INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
