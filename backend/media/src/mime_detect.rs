//! Media type detection for uploads and results.

use std::path::Path;

use visionquest_core::ACCEPTED_MIME_TYPES;

/// Declared media type from the file extension, the way a browser fills `File.type`.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" | "pjpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "avif"         => "image/avif",
        "svg"          => "image/svg+xml",
        "tiff" | "tif" => "image/tiff",
        "pdf"          => "application/pdf",
        "txt"          => "text/plain",
        "json"         => "application/json",
        _              => "application/octet-stream",
    }
}

/// Media type from magic bytes, for the formats this tool deals with.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(PNG) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Whether `mime` is one of the accepted upload types.
pub fn is_accepted(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

pub fn extension_for(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or("").trim() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
