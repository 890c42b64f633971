use std::time::Instant;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, multipart, Client};
use tracing::{debug, info, warn};

use visionquest_core::{AnnotatedImage, DetectionClient, UploadedImage, VisionError, VisionResult};
use visionquest_media::sniff_mime_type;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Fallback when the endpoint gives no usable type.
const FALLBACK_RESULT_MIME: &str = "image/jpeg";

/// Detection endpoint reached over HTTP.
///
/// One POST per call, no retries and no client-side timeout.
pub struct HttpDetectionClient {
    client: Client,
    endpoint: String,
    wake_url: String,
}

impl HttpDetectionClient {
    pub fn new(endpoint: impl Into<String>, wake_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            wake_url: wake_url.into(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn connection_error(&self, err: &reqwest::Error) -> VisionError {
        VisionError::Connection {
            wake_url: self.wake_url.clone(),
            cause: err.to_string(),
        }
    }
}

#[async_trait]
impl DetectionClient for HttpDetectionClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn predict(&self, image: &UploadedImage) -> VisionResult<AnnotatedImage> {
        let start = Instant::now();

        let part = multipart::Part::bytes(image.data.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| anyhow!("invalid upload media type '{}': {}", image.mime_type, e))?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        debug!(endpoint = %self.endpoint, bytes = image.len(), "Posting image to detection endpoint");

        let response = match self.client.post(&self.endpoint).multipart(form).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(VisionError::Config(format!(
                    "invalid detection endpoint '{}': {}",
                    self.endpoint, e
                )));
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Detection endpoint unreachable");
                return Err(self.connection_error(&e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = match response.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => status.canonical_reason().unwrap_or_default().to_string(),
                Err(_) => "No error detail available".to_string(),
            };
            warn!(status = status.as_u16(), "Detection endpoint returned an error");
            return Err(VisionError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty());

        let data = response
            .bytes()
            .await
            .context("Failed to read detection response body")?;

        let mime_type = declared
            .or_else(|| sniff_mime_type(&data).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_RESULT_MIME.to_string());

        info!(
            endpoint = %self.endpoint,
            bytes = data.len(),
            mime = %mime_type,
            latency_ms = start.elapsed().as_millis() as u64,
            "Detection completed"
        );

        Ok(AnnotatedImage { mime_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Router};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/predict/")
    }

    fn jpeg_upload() -> UploadedImage {
        UploadedImage::new("street.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
    }

    /// Echoes the `file` field back with a PNG content type, after checking it.
    async fn echo_file(mut multipart: Multipart) -> (StatusCode, [(&'static str, &'static str); 1], Vec<u8>) {
        let mut fields = Vec::new();
        let mut body = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                assert_eq!(field.file_name(), Some("street.jpg"));
                assert_eq!(field.content_type(), Some("image/jpeg"));
                body = field.bytes().await.unwrap().to_vec();
            }
            fields.push(name);
        }
        assert_eq!(fields, vec!["file"]);
        body.reverse();
        (StatusCode::OK, [("content-type", "image/png")], body)
    }

    #[tokio::test]
    async fn returns_raw_body_and_type() {
        let url = spawn(Router::new().route("/predict/", post(echo_file))).await;
        let client = HttpDetectionClient::new(url, "https://wake.example");

        let result = client.predict(&jpeg_upload()).await.unwrap();
        assert_eq!(result.mime_type, "image/png");
        assert_eq!(&result.data[..], &[3, 2, 1, 0xE0, 0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn sniffs_type_when_header_missing() {
        let app = Router::new().route(
            "/predict/",
            post(|| async {
                let png = vec![0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
                axum::response::Response::new(axum::body::Body::from(png))
            }),
        );
        let client = HttpDetectionClient::new(spawn(app).await, "https://wake.example");

        let result = client.predict(&jpeg_upload()).await.unwrap();
        assert_eq!(result.mime_type, "image/png");
        assert_eq!(result.data.len(), 8);
    }

    #[tokio::test]
    async fn error_status_embeds_code_and_text() {
        let app = Router::new().route(
            "/predict/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let client = HttpDetectionClient::new(spawn(app).await, "https://wake.example");

        let err = client.predict(&jpeg_upload()).await.unwrap_err();
        assert!(matches!(err, VisionError::Api { status: 500, .. }));
        assert_eq!(err.to_string(), "API Error (500): model crashed");
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_reason() {
        let app = Router::new().route("/predict/", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let client = HttpDetectionClient::new(spawn(app).await, "https://wake.example");

        let err = client.predict(&jpeg_upload()).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error (503): Service Unavailable");
    }

    #[tokio::test]
    async fn unreachable_endpoint_gives_remediation() {
        // bind then drop so the port is known to be closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpDetectionClient::new(format!("http://{addr}/predict/"), "https://wake.example/space");
        let err = client.predict(&jpeg_upload()).await.unwrap_err();
        assert!(err.is_transport());
        let msg = err.to_string();
        assert!(msg.contains("Fix 1: Visit the Space at https://wake.example/space to wake it up."));
        assert!(msg.contains("Fix 2:"));
        assert!(!msg.contains("API Error"));
    }

    #[tokio::test]
    async fn malformed_endpoint_is_a_config_error() {
        let client = HttpDetectionClient::new("not a url", "https://wake.example");
        let err = client.predict(&jpeg_upload()).await.unwrap_err();
        assert!(matches!(err, VisionError::Config(_)));
    }
}
