use std::path::Path;

use anyhow::Result;

use visionquest_media::{read_upload, to_data_url};
use visionquest_session::Capabilities;

use crate::config::CliContext;
use crate::terminal_output::note_warn;

/// Describe an already-annotated image file.
pub async fn run(ctx: &CliContext, file: &Path) -> Result<()> {
    let image = read_upload(file, None).await?;
    let caps = Capabilities::from_config(&ctx.config)?;
    if !caps.insight.is_available() {
        note_warn("No AI credential configured; set GEMINI_API_KEY.");
    }
    let text = caps
        .insight
        .analyze(&to_data_url(&image.mime_type, &image.data))
        .await;
    println!("{text}");
    Ok(())
}
