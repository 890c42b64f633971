use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use visionquest_core::{HistoryRecord, HistoryStorage, HISTORY_STORAGE_KEY};

/// Decode a stored history value. Anything unreadable is treated as an empty list.
pub(crate) fn decode_records(raw: &str) -> Vec<HistoryRecord> {
    match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Stored history is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Storage kept only in process memory. Used by tests and `--history memory`.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStorage {
    value: Arc<RwLock<Option<String>>>,
}

impl InMemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the raw stored value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(raw.into()))),
        }
    }

    /// The raw stored value, `None` when the key is absent.
    pub fn raw(&self) -> Option<String> {
        self.value.read().ok().and_then(|v| v.clone())
    }
}

#[async_trait]
impl HistoryStorage for InMemoryHistoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.raw().map(|raw| decode_records(&raw)).unwrap_or_default())
    }

    async fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        let mut value = self
            .value
            .write()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;
        *value = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut value = self
            .value
            .write()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;
        *value = None;
        Ok(())
    }
}

/// One JSON file named after the storage key inside a state directory.
pub struct JsonFileHistoryStorage {
    path: PathBuf,
}

impl JsonFileHistoryStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{HISTORY_STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStorage for JsonFileHistoryStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(decode_records(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", self.path)),
        }
    }

    async fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let raw = serde_json::to_string(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        debug!(path = ?self.path, count = records.len(), "History saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", self.path)),
        }
    }
}
