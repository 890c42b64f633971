//! CLI Predict Command
//!
//! Select a file, send it for detection, and store the annotated result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use visionquest_detection::FixedDetectionClient;
use visionquest_media::{from_data_url, read_upload};
use visionquest_session::{Capabilities, PredictOutcome, SkipReason, VisionSession};

use crate::config::CliContext;
use crate::terminal_output::{format_bytes, note_dim, note_error, note_info, note_success, note_warn};

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image to analyze (JPG or PNG)
    pub file: PathBuf,
    /// Declared media type; defaults to one derived from the file extension
    #[arg(long)]
    pub mime: Option<String>,
    /// Write the annotated image here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also ask the AI assistant to describe the result
    #[arg(long)]
    pub insight: bool,
    /// Upload original and result to the hosted backend
    #[arg(long, requires = "user")]
    pub publish: bool,
    /// Owner of published rows
    #[arg(long)]
    pub user: Option<String>,
    /// Skip the network and echo the upload back as the result
    #[arg(long)]
    pub offline: bool,
}

pub async fn run(ctx: &CliContext, args: PredictArgs) -> Result<()> {
    let image = read_upload(&args.file, args.mime.as_deref()).await?;

    let mut caps = Capabilities::from_config(&ctx.config)?;
    if args.offline {
        info!("Offline mode: detection answers with the upload itself");
        caps.detection = Arc::new(FixedDetectionClient::new(
            image.mime_type.clone(),
            image.data.clone(),
        ));
    }
    let session = VisionSession::start(caps).await?;

    let file_name = image.file_name.clone();
    let size = image.len();
    if !session.select_file(image) {
        let snapshot = session.snapshot().await;
        note_error(snapshot.error.as_deref().unwrap_or("Upload rejected"));
        return Ok(());
    }
    note_info(&format!(
        "Analyzing {file_name} ({}) via {}",
        format_bytes(size),
        session.capabilities().detection.endpoint()
    ));

    let record = match session.predict().await {
        PredictOutcome::Completed(record) => record,
        PredictOutcome::Failed(message) => {
            note_error(&message);
            return Ok(());
        }
        PredictOutcome::Skipped(SkipReason::NoSelection) => {
            note_warn("Nothing selected");
            return Ok(());
        }
        PredictOutcome::Skipped(SkipReason::InFlight) => {
            note_warn("A prediction is already running");
            return Ok(());
        }
    };

    note_success(&format!("Detection complete: history record {}", record.id));
    if let Some(error) = session.snapshot().await.error {
        note_warn(&error);
    }

    if let Some(path) = &args.output {
        let (mime, bytes) = from_data_url(&record.result_url)?;
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        note_dim(&format!("{mime}, {} written to {}", format_bytes(bytes.len()), path.display()));
    }

    if args.insight {
        if let Some(text) = session.insight().await {
            println!("\n{text}\n");
        }
    }

    if args.publish {
        // clap guarantees `--user` alongside `--publish`
        let user = args.user.as_deref().unwrap_or_default();
        match session.publish(user).await {
            Ok(receipt) => {
                note_success("Published to the hosted backend");
                note_dim(&format!("original: {}", receipt.original_url));
                note_dim(&format!("result:   {}", receipt.result_url));
            }
            Err(e) => note_error(&e.to_string()),
        }
    }

    Ok(())
}
