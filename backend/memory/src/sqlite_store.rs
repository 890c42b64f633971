/// SQLite-backed history storage.
///
/// Holds the serialized history list under the storage key in a small
/// key/value table, so `clear` deletes the row and `load` of a missing row
/// yields an empty list.
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use visionquest_core::{HistoryRecord, HistoryStorage, HISTORY_STORAGE_KEY};

use crate::store::decode_records;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
     key        TEXT PRIMARY KEY,
     value      TEXT NOT NULL,
     updated_at INTEGER NOT NULL
 );";

pub struct SqliteHistoryStorage {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStorage {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let conn = Connection::open(path.as_ref())
            .context("Failed to open SQLite history database")?;
        conn.execute_batch(&format!("PRAGMA journal_mode=WAL;\n{SCHEMA}"))
            .context("Failed to initialize history schema")?;

        info!("SqliteHistoryStorage opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    async fn raw(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![HISTORY_STORAGE_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

#[async_trait]
impl HistoryStorage for SqliteHistoryStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.raw().await?.map(|raw| decode_records(&raw)).unwrap_or_default())
    }

    async fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![HISTORY_STORAGE_KEY, raw, chrono::Utc::now().timestamp_millis()],
        )?;
        debug!(count = records.len(), "History saved to SQLite");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![HISTORY_STORAGE_KEY])?;
        Ok(())
    }
}
