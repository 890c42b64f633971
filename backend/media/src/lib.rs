//! Media handling: upload intake, media types, data-URL encoding, and the local viewer.

pub mod encoding;
pub mod mime_detect;
pub mod upload;
pub mod viewer;

pub use encoding::{base64_payload, from_data_url, to_data_url};
pub use mime_detect::{detect_mime_type, extension_for, is_accepted, sniff_mime_type};
pub use upload::{preview_url, read_upload, validate_upload};
pub use viewer::viewer_router;
