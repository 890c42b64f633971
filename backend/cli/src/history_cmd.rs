//! CLI History Subcommands
//!
//! List, inspect and clear the locally persisted results.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use visionquest_media::from_data_url;
use visionquest_memory::HistoryStore;
use visionquest_session::Capabilities;

use crate::config::CliContext;
use crate::terminal_output::{format_bytes, note_dim, note_info, note_success, render_table, Column};

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List stored results, newest first
    List,
    /// Show one stored result
    Show {
        id: i64,
        /// Write the stored image here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove every stored result
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &CliContext, cmd: HistoryCommands) -> Result<()> {
    let caps = Capabilities::from_config(&ctx.config)?;
    let mut store = HistoryStore::load(caps.history).await?;

    match cmd {
        HistoryCommands::List => {
            if store.is_empty() {
                note_info("No history yet.");
                return Ok(());
            }
            let columns = vec![
                Column::right("ID"),
                Column::left("Created"),
                Column::left("Type"),
                Column::right("Size"),
            ];
            let rows: Vec<Vec<String>> = store
                .records()
                .iter()
                .map(|r| {
                    let (mime, size) = match from_data_url(&r.result_url) {
                        Ok((mime, bytes)) => (mime, format_bytes(bytes.len())),
                        Err(_) => ("?".to_string(), "corrupt".to_string()),
                    };
                    vec![
                        r.id.to_string(),
                        r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        mime,
                        size,
                    ]
                })
                .collect();
            print!("{}", render_table(&columns, &rows));
        }
        HistoryCommands::Show { id, output } => {
            let Some(record) = store.get(id) else {
                bail!("No history record with id {id}");
            };
            let (mime, bytes) = from_data_url(&record.result_url)?;
            println!("id:         {}", record.id);
            println!("created_at: {}", record.created_at.to_rfc3339());
            println!("type:       {mime}");
            println!("size:       {}", format_bytes(bytes.len()));
            if let Some(path) = output {
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                note_dim(&format!("written to {}", path.display()));
            }
        }
        HistoryCommands::Clear { yes } => {
            if !yes && !confirm(&format!("Clear {} history record(s)?", store.len()))? {
                note_info("Cancelled.");
                return Ok(());
            }
            let removed = store.clear().await?;
            note_success(&format!("Cleared {removed} record(s)"));
        }
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
