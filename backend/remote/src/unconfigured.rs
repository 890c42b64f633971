use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use visionquest_core::{RemotePersistence, RemoteHistoryRow, VisionError, VisionResult};

pub const UPLOAD_UNCONFIGURED_MESSAGE: &str = "Supabase is not configured properly.";
pub const INSERT_UNCONFIGURED_MESSAGE: &str = "Supabase is not configured.";

/// Stand-in when no backend URL or public key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredRemote;

#[async_trait]
impl RemotePersistence for UnconfiguredRemote {
    fn is_configured(&self) -> bool {
        false
    }

    async fn upload_object(&self, _data: Bytes, _mime_type: &str, _path: &str) -> VisionResult<String> {
        Err(VisionError::RemoteUnconfigured(UPLOAD_UNCONFIGURED_MESSAGE.to_string()))
    }

    async fn save_record(
        &self,
        _user_id: &str,
        _original_url: &str,
        _result_url: &str,
        _insight: &str,
    ) -> VisionResult<Vec<RemoteHistoryRow>> {
        Err(VisionError::RemoteUnconfigured(INSERT_UNCONFIGURED_MESSAGE.to_string()))
    }

    async fn fetch_history(&self, user_id: &str) -> VisionResult<Vec<RemoteHistoryRow>> {
        debug!(user_id, "Remote history requested without a backend");
        Ok(Vec::new())
    }
}
