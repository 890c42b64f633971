//! Upload intake: read a user-selected file and validate its declared type.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use visionquest_core::{UploadedImage, VisionError};

use crate::encoding::to_data_url;
use crate::mime_detect::{detect_mime_type, is_accepted, sniff_mime_type};

/// Read `path` into an upload. `declared_mime` overrides the extension-based type.
pub async fn read_upload(path: &Path, declared_mime: Option<&str>) -> Result<UploadedImage> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = declared_mime
        .map(str::to_string)
        .unwrap_or_else(|| detect_mime_type(path).to_string());

    debug!(file = %file_name, mime = %mime_type, bytes = data.len(), "Read upload");
    Ok(UploadedImage::new(file_name, mime_type, data))
}

/// Reject anything whose declared type is not JPEG or PNG.
///
/// The declared type is authoritative; a content mismatch is only logged.
pub fn validate_upload(image: &UploadedImage) -> Result<(), VisionError> {
    if !is_accepted(&image.mime_type) {
        debug!(file = %image.file_name, mime = %image.mime_type, "Rejected upload type");
        return Err(VisionError::invalid_upload());
    }
    if let Some(sniffed) = sniff_mime_type(&image.data) {
        if !sniffed.eq_ignore_ascii_case(image.mime_type.split(';').next().unwrap_or("").trim()) {
            warn!(
                file = %image.file_name,
                declared = %image.mime_type,
                sniffed = %sniffed,
                "Upload content does not match its declared type"
            );
        }
    }
    Ok(())
}

/// Local previewable reference for an accepted upload.
pub fn preview_url(image: &UploadedImage) -> String {
    to_data_url(&image.mime_type, &image.data)
}
