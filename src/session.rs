//! Persisted session state: the SportsDataIO API key and the preferred
//! sportsbook group.
//!
//! Values live in a small SQLite `settings` table and are mirrored in memory
//! so the HTTP client can read the key on every request without touching
//! the database.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

pub const API_KEY_SETTING: &str = "sdio-api-key";
pub const SPORTSBOOK_GROUP_SETTING: &str = "sdio-sportsbook-group";

/// Sportsbook groups are interpolated into provider URL paths, so only
/// plain alphanumeric ids are accepted.
pub fn is_valid_sportsbook_group(group: &str) -> bool {
    !group.is_empty() && group.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Key/value settings table backed by a single SQLite connection.
#[derive(Clone)]
pub struct SettingsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsStore {
    /// Open (or create) the settings database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open settings database {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SettingsStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("settings connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at",
            params![key, value, Utc::now()],
        )?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#;

#[derive(Debug, Clone)]
struct SessionState {
    api_key: Option<String>,
    sportsbook_group: String,
}

/// The API key and sportsbook preference for this process, passed by
/// reference to everything that talks to the provider.
pub struct Session {
    store: SettingsStore,
    state: RwLock<SessionState>,
    default_group: String,
}

impl Session {
    /// Load persisted values, falling back to `default_group` when no
    /// sportsbook group has been saved.
    pub fn load(store: SettingsStore, default_group: &str) -> Result<Self> {
        let api_key = store.get(API_KEY_SETTING)?.filter(|k| !k.trim().is_empty());
        let sportsbook_group = store
            .get(SPORTSBOOK_GROUP_SETTING)?
            .unwrap_or_else(|| default_group.to_string());

        info!(
            "Session loaded (api key: {}, sportsbook group: {})",
            if api_key.is_some() { "present" } else { "absent" },
            sportsbook_group
        );

        Ok(Session {
            store,
            state: RwLock::new(SessionState {
                api_key,
                sportsbook_group,
            }),
            default_group: default_group.to_string(),
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api_key(&self) -> Option<String> {
        self.read().api_key.clone()
    }

    pub fn has_api_key(&self) -> bool {
        self.read().api_key.is_some()
    }

    pub fn sportsbook_group(&self) -> String {
        self.read().sportsbook_group.clone()
    }

    /// Set the key in memory first, then persist it. The in-memory value is
    /// kept even when persisting fails.
    pub fn save_api_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("API key must not be empty");
        }
        self.write().api_key = Some(key.to_string());
        self.store
            .set(API_KEY_SETTING, key)
            .context("Failed to persist API key")
    }

    pub fn clear_api_key(&self) -> Result<()> {
        self.write().api_key = None;
        self.store
            .delete(API_KEY_SETTING)
            .context("Failed to remove persisted API key")
    }

    /// An empty group resets to the configured default.
    pub fn save_sportsbook_group(&self, group: &str) -> Result<()> {
        let group = match group.trim() {
            "" => self.default_group.clone(),
            g => g.to_string(),
        };
        if !is_valid_sportsbook_group(&group) {
            anyhow::bail!("invalid sportsbook group '{}'", group);
        }
        self.write().sportsbook_group = group.clone();
        self.store
            .set(SPORTSBOOK_GROUP_SETTING, &group)
            .context("Failed to persist sportsbook group")
    }
}
