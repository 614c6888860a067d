// ABOUTME: Key-value settings store trait with sqlite and in-memory implementations
// ABOUTME: The reconciler uses it solely to remember the subscription id
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic key-value settings persistence.
//!
//! The reconciler only ever touches one fixed key, but the store is a plain
//! string key-value interface so the host application can share its own
//! settings table. [`MemorySettingsStore`] backs tests and fixtures.

use crate::errors::BridgeResult;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value settings persistence seam
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> BridgeResult<Option<String>>;

    /// Create or overwrite the value stored under `key`
    async fn upsert(&self, key: &str, value: &str) -> BridgeResult<()>;
}

/// Settings store backed by the sqlite `settings` table
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn upsert(&self, key: &str, value: &str) -> BridgeResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory settings store for tests and ephemeral deployments
#[derive(Default)]
pub struct MemorySettingsStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
