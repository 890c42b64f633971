//! Conversions between binary images and their textual `data:` URL form.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;

/// Encode `data` as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

/// Decode a base64 `data:` URL back into its media type and bytes.
pub fn from_data_url(url: &str) -> Result<(String, Bytes)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URL has no payload separator"))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("data URL is not base64-encoded"))?;
    let data = STANDARD
        .decode(payload.trim())
        .context("data URL payload is not valid base64")?;
    let mime_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    Ok((mime_type.to_string(), Bytes::from(data)))
}

/// The bare base64 payload: the part after the comma of a data URL, or the input itself.
pub fn base64_payload(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        encoded.split_once(',').map_or("", |(_, payload)| payload)
    } else {
        encoded
    }
}
