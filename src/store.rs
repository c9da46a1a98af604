//! Local key-value persistence
//!
//! One key per logical document (the roadmap tree, each wiki content
//! section). Values are JSON or markdown strings; the store never looks
//! inside them.
//!
//! [`SqliteStore`] keeps entries in a SQLite file through Diesel. The path
//! can be overridden with the SAPLING_DB_PATH env var.

use crate::schema::kv_entries;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Pool error: {0}")]
    Pool(#[from] diesel::r2d2::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Returns whether the key existed
    fn remove(&self, key: &str) -> Result<bool>;
    /// All keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// Walk up directory tree to find .sapling folder (like git finds .git)
/// Can be overridden with SAPLING_DB_PATH env var
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("SAPLING_DB_PATH") {
        return PathBuf::from(path);
    }

    if let Ok(current_dir) = std::env::current_dir() {
        let mut dir = current_dir.as_path();
        loop {
            let sapling_dir = dir.join(".sapling");
            if sapling_dir.is_dir() {
                return sapling_dir.join("sapling.db");
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    // No .sapling found - default to current directory
    PathBuf::from(".sapling/sapling.db")
}

// ============================================================================
// Diesel Models
// ============================================================================

#[derive(Insertable)]
#[diesel(table_name = kv_entries)]
struct NewEntry<'a> {
    key: &'a str,
    value: &'a str,
    updated_at: &'a str,
}

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed store with a small connection pool
pub struct SqliteStore {
    pool: DbPool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open the store at the default path, creating its directory if needed
    pub fn open() -> Result<Self> {
        let path = default_db_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        Self::open_at(&path)
    }

    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(2)
            .build(manager)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            pool,
            path: path.as_ref().to_path_buf(),
        };
        store.init_schema()?;
        tracing::debug!(path = %store.path.display(), "opened key-value store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;
        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&mut conn)?;
        Ok(())
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_conn()?;
        let value = kv_entries::table
            .find(key)
            .select(kv_entries::value)
            .first::<String>(&mut conn)
            .optional()?;
        tracing::debug!(key, found = value.is_some(), "store get");
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.get_conn()?;
        let now = chrono::Local::now().to_rfc3339();
        diesel::replace_into(kv_entries::table)
            .values(&NewEntry {
                key,
                value,
                updated_at: &now,
            })
            .execute(&mut conn)?;
        tracing::debug!(key, bytes = value.len(), "store set");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_conn()?;
        let removed = diesel::delete(kv_entries::table.find(key)).execute(&mut conn)?;
        Ok(removed > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.get_conn()?;
        let keys = kv_entries::table
            .select(kv_entries::key)
            .order(kv_entries::key.asc())
            .load::<String>(&mut conn)?;
        Ok(keys)
    }
}

/// In-process store, used by tests and as a scratch store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}
