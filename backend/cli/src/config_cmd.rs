//! CLI Config Subcommands

use anyhow::{bail, Result};
use clap::Subcommand;

use visionquest_config::{apply_all_defaults, redact, validate, write_config, VisionQuestConfig};

use crate::config::CliContext;
use crate::terminal_output::{note_dim, note_success, note_warn};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with credentials masked
    Show,
    /// Write a starter config file with every default spelled out
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run(ctx: &CliContext, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            note_dim(&format!("source: {}", ctx.path.display()));
            let masked = redact(&serde_json::to_value(&ctx.config)?);
            print!("{}", serde_yaml::to_string(&masked)?);
            for warning in validate(&ctx.config).warnings {
                note_warn(&format!("{}: {}", warning.path, warning.message));
            }
        }
        ConfigCommands::Init { force } => {
            if ctx.path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", ctx.path.display());
            }
            let state_dir = ctx.path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let starter = apply_all_defaults(VisionQuestConfig::default(), state_dir);
            write_config(&starter, &ctx.path).await?;
            note_success(&format!("Wrote {}", ctx.path.display()));
        }
    }
    Ok(())
}
