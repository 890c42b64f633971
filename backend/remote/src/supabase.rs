//! Supabase storage + PostgREST client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, info, warn};

use visionquest_core::{RemotePersistence, RemoteHistoryRow, VisionError, VisionResult};

pub struct SupabaseRemote {
    client: Client,
    base_url: String,
    public_key: String,
    bucket: String,
    table: String,
}

#[derive(Serialize)]
struct NewRow<'a> {
    user_id: &'a str,
    original_url: &'a str,
    result_url: &'a str,
    insight: &'a str,
}

impl SupabaseRemote {
    pub fn new(
        base_url: impl Into<String>,
        public_key: impl Into<String>,
        bucket: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            public_key: public_key.into(),
            bucket: bucket.into(),
            table: table.into(),
        }
    }

    /// Address under which an uploaded object is publicly readable.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.public_key)
            .bearer_auth(&self.public_key)
    }

    async fn send(&self, builder: RequestBuilder) -> VisionResult<Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| VisionError::Other(anyhow::Error::new(e).context("Supabase request failed")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!(status = status.as_u16(), %message, "Supabase request failed");
        Err(VisionError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull a human-readable message out of a Supabase error body.
fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        ["message", "error_description", "error", "msg"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
            .map(str::to_string)
    });
    Some(from_json.unwrap_or_else(|| body.trim().to_string()))
}

#[async_trait]
impl RemotePersistence for SupabaseRemote {
    fn is_configured(&self) -> bool {
        true
    }

    async fn upload_object(&self, data: Bytes, mime_type: &str, path: &str) -> VisionResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        debug!(path, bytes = data.len(), "Uploading object");
        let request = self
            .client
            .post(&url)
            .header("content-type", mime_type)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(data);
        self.send(request).await?;

        let public = self.public_url(path);
        info!(path, "Object uploaded");
        Ok(public)
    }

    async fn save_record(
        &self,
        user_id: &str,
        original_url: &str,
        result_url: &str,
        insight: &str,
    ) -> VisionResult<Vec<RemoteHistoryRow>> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let rows = [NewRow {
            user_id,
            original_url,
            result_url,
            insight,
        }];
        let request = self
            .client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.send(request).await?;
        let stored: Vec<RemoteHistoryRow> = response
            .json()
            .await
            .map_err(|e| VisionError::Other(anyhow::anyhow!("Failed to parse inserted rows: {e}")))?;
        info!(user_id, rows = stored.len(), "History row saved");
        Ok(stored)
    }

    async fn fetch_history(&self, user_id: &str) -> VisionResult<Vec<RemoteHistoryRow>> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let user_filter = format!("eq.{user_id}");
        let request = self.client.get(&url).query(&[
            ("select", "*"),
            ("user_id", user_filter.as_str()),
            ("order", "created_at.desc"),
        ]);
        let response = self.send(request).await?;
        let rows: Vec<RemoteHistoryRow> = response
            .json()
            .await
            .map_err(|e| VisionError::Other(anyhow::anyhow!("Failed to parse history rows: {e}")))?;
        debug!(user_id, rows = rows.len(), "Remote history fetched");
        Ok(rows)
    }
}
