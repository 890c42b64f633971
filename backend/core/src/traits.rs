use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::error::VisionResult;
use crate::types::{AnnotatedImage, HistoryRecord, RemoteHistoryRow, UploadedImage};

/// Client for the remote object-detection endpoint.
#[async_trait]
pub trait DetectionClient: Send + Sync {
    /// Endpoint this client posts to (for logging and status output).
    fn endpoint(&self) -> &str;

    /// Submit one image and return the annotated image the endpoint produced.
    async fn predict(&self, image: &UploadedImage) -> VisionResult<AnnotatedImage>;
}

/// Natural-language description of a detection result.
///
/// Implementations never fail: every failure mode degrades to placeholder text.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// `image_base64` may be a `data:` URL or bare base64.
    async fn analyze(&self, image_base64: &str) -> String;
}

/// Hosted object storage plus history row store.
#[async_trait]
pub trait RemotePersistence: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Upload a binary object under `path` and return its public address.
    async fn upload_object(&self, data: Bytes, mime_type: &str, path: &str) -> VisionResult<String>;

    /// Insert one history row and return what the backend stored.
    async fn save_record(
        &self,
        user_id: &str,
        original_url: &str,
        result_url: &str,
        insight: &str,
    ) -> VisionResult<Vec<RemoteHistoryRow>>;

    /// All rows for `user_id`, newest first.
    async fn fetch_history(&self, user_id: &str) -> VisionResult<Vec<RemoteHistoryRow>>;
}

/// Durable storage for the local history list.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Backend name, e.g. "file" or "sqlite".
    fn name(&self) -> &str;

    /// Load the stored list. A missing key yields an empty list.
    async fn load(&self) -> Result<Vec<HistoryRecord>>;

    /// Replace the stored list with `records`.
    async fn save(&self, records: &[HistoryRecord]) -> Result<()>;

    /// Remove the stored key entirely.
    async fn clear(&self) -> Result<()>;
}
