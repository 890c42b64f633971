//! CLI Remote Subcommands

use anyhow::Result;
use clap::Subcommand;

use visionquest_session::Capabilities;

use crate::config::CliContext;
use crate::terminal_output::{note_error, note_info, note_warn, render_table, Column};

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Rows saved to the hosted backend for one user, newest first
    History {
        #[arg(short, long)]
        user: String,
    },
}

pub async fn run(ctx: &CliContext, cmd: RemoteCommands) -> Result<()> {
    let caps = Capabilities::from_config(&ctx.config)?;
    match cmd {
        RemoteCommands::History { user } => {
            if !caps.remote.is_configured() {
                note_warn("Hosted backend is not configured; set SUPABASE_URL and SUPABASE_ANON_KEY.");
            }
            let rows = match caps.remote.fetch_history(&user).await {
                Ok(rows) => rows,
                Err(e) => {
                    note_error(&e.to_string());
                    return Ok(());
                }
            };
            if rows.is_empty() {
                note_info(&format!("No remote history for {user}."));
                return Ok(());
            }
            let columns = vec![
                Column::right("ID"),
                Column::left("Created"),
                Column::left("Result").max_width(60),
                Column::left("Insight").max_width(40),
            ];
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.id.map(|id| id.to_string()).unwrap_or_default(),
                        r.created_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default(),
                        r.result_url.clone(),
                        r.insight.replace('\n', " "),
                    ]
                })
                .collect();
            print!("{}", render_table(&columns, &table));
        }
    }
    Ok(())
}
