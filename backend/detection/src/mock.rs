use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use visionquest_core::{AnnotatedImage, DetectionClient, UploadedImage, VisionError, VisionResult};

/// A detection client that answers every call with a canned payload.
pub struct FixedDetectionClient {
    payload: AnnotatedImage,
    failure: Option<(u16, String)>,
    calls: AtomicUsize,
}

impl FixedDetectionClient {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            payload: AnnotatedImage {
                mime_type: mime_type.into(),
                data: data.into(),
            },
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every call with an HTTP error instead.
    pub fn with_failure(mut self, status: u16, detail: impl Into<String>) -> Self {
        self.failure = Some((status, detail.into()));
        self
    }

    /// Number of predictions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetectionClient for FixedDetectionClient {
    fn endpoint(&self) -> &str {
        "fixed://"
    }

    async fn predict(&self, _image: &UploadedImage) -> VisionResult<AnnotatedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((status, detail)) => Err(VisionError::Api {
                status: *status,
                detail: detail.clone(),
            }),
            None => Ok(self.payload.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_returns_payload() {
        let client = FixedDetectionClient::new("image/png", vec![1u8, 2, 3]);
        let image = UploadedImage::new("a.png", "image/png", vec![0u8]);
        let first = client.predict(&image).await.unwrap();
        let second = client.predict(&image).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn configured_failure_is_an_api_error() {
        let client = FixedDetectionClient::new("image/png", vec![]).with_failure(502, "Bad Gateway");
        let image = UploadedImage::new("a.png", "image/png", vec![0u8]);
        let err = client.predict(&image).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error (502): Bad Gateway");
    }
}
