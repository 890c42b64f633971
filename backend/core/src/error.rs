use thiserror::Error;

/// Message shown when an upload has a media type outside the allow-list.
pub const INVALID_UPLOAD_MESSAGE: &str = "Please use a valid JPG or PNG image.";

/// Top-level error type for VisionQuest.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The selected file was rejected before any network call.
    #[error("{0}")]
    InvalidUpload(String),

    /// The detection endpoint answered with a non-success status.
    #[error("API Error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The detection endpoint could not be reached at all.
    #[error(
        "Connection failed (CORS Error). \n\n\
         Fix 1: Visit the Space at {wake_url} to wake it up.\n\
         Fix 2: Ensure your FastAPI backend has CORSMiddleware enabled for allow_origins=[\"*\"]."
    )]
    Connection { wake_url: String, cause: String },

    #[error("{0}")]
    RemoteUnconfigured(String),

    #[error("remote backend error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VisionError {
    pub fn invalid_upload() -> Self {
        Self::InvalidUpload(INVALID_UPLOAD_MESSAGE.to_string())
    }

    /// True for failures where the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

pub type VisionResult<T> = Result<T, VisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_embeds_status() {
        let err = VisionError::Api {
            status: 503,
            detail: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API Error (503): Service Unavailable");
    }

    #[test]
    fn connection_error_lists_both_fixes() {
        let err = VisionError::Connection {
            wake_url: "https://example.test/space".into(),
            cause: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Connection failed"));
        assert!(msg.contains("Fix 1: Visit the Space at https://example.test/space to wake it up."));
        assert!(msg.contains("Fix 2:"));
        assert!(!msg.contains("connection refused"));
        assert!(err.is_transport());
    }
}
