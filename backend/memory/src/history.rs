//! The bounded, newest-first list of past results.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use visionquest_core::{AnnotatedImage, HistoryRecord, HistoryStorage, HISTORY_LIMIT};
use visionquest_media::to_data_url;

pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    storage: Arc<dyn HistoryStorage>,
}

impl HistoryStore {
    /// An empty list over `storage`; call [`HistoryStore::load`] to hydrate it.
    pub fn new(storage: Arc<dyn HistoryStorage>) -> Self {
        Self {
            records: Vec::new(),
            storage,
        }
    }

    /// Hydrate from storage. Stored lists longer than the limit are cut back.
    pub async fn load(storage: Arc<dyn HistoryStorage>) -> Result<Self> {
        let mut records = storage.load().await?;
        records.truncate(HISTORY_LIMIT);
        info!(backend = storage.name(), count = records.len(), "History loaded");
        Ok(Self { records, storage })
    }

    /// Newest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn storage(&self) -> &Arc<dyn HistoryStorage> {
        &self.storage
    }

    /// Encode `image`, insert it at the front and drop anything past the limit.
    /// Does not touch storage.
    pub fn prepend(&mut self, image: &AnnotatedImage) -> HistoryRecord {
        self.prepend_at(image, Utc::now().timestamp_millis())
    }

    /// Like [`HistoryStore::prepend`], with the id taken from `requested_ms`
    /// (when the request was sent) and `created_at` from the current time.
    pub fn prepend_at(&mut self, image: &AnnotatedImage, requested_ms: i64) -> HistoryRecord {
        // Ids double as keys, so keep them strictly increasing even within one millisecond.
        let id = match self.records.first() {
            Some(front) => requested_ms.max(front.id.saturating_add(1)),
            None => requested_ms,
        };
        let record = HistoryRecord {
            id,
            result_url: to_data_url(&image.mime_type, &image.data),
            created_at: Utc::now(),
        };
        self.records.insert(0, record.clone());
        self.records.truncate(HISTORY_LIMIT);
        debug!(id, count = self.records.len(), "History record added");
        record
    }

    /// Write the full list to storage.
    pub async fn persist(&self) -> Result<()> {
        self.storage.save(&self.records).await
    }

    /// [`HistoryStore::prepend`] followed by [`HistoryStore::persist`].
    pub async fn push(&mut self, image: &AnnotatedImage) -> Result<HistoryRecord> {
        let record = self.prepend(image);
        self.persist().await?;
        Ok(record)
    }

    /// Empty the list and remove the stored key. Returns how many records were dropped.
    pub async fn clear(&mut self) -> Result<usize> {
        self.storage.clear().await?;
        let removed = self.records.len();
        self.records.clear();
        info!(removed, "History cleared");
        Ok(removed)
    }
}
