mod api;
mod config;
mod config_cmd;
mod history_cmd;
mod insight_cmd;
mod predict_cmd;
mod remote_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use visionquest_logging::init_logger;
use visionquest_session::Capabilities;

use config::CliContext;

#[derive(Parser)]
#[command(name = "visionquest")]
#[command(about = "VisionQuest: object detection from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.visionquest/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run object detection on an image and store the result
    Predict(predict_cmd::PredictArgs),
    /// Locally stored results
    #[command(subcommand)]
    History(history_cmd::HistoryCommands),
    /// Ask the AI assistant to describe an annotated image
    Insight {
        file: PathBuf,
    },
    /// Hosted backend
    #[command(subcommand)]
    Remote(remote_cmd::RemoteCommands),
    /// Inspect or create the config file
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
    /// Serve stored results over HTTP
    Serve {
        /// Port to bind the viewer to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = CliContext::load(cli.config.as_deref()).await?;

    let log_dir = ctx.log_dir();
    let _guard = init_logger(log_dir.as_deref(), ctx.log_level());

    match cli.command {
        Commands::Predict(args) => predict_cmd::run(&ctx, args).await?,
        Commands::History(cmd) => history_cmd::run(&ctx, cmd).await?,
        Commands::Insight { file } => insight_cmd::run(&ctx, &file).await?,
        Commands::Remote(cmd) => remote_cmd::run(&ctx, cmd).await?,
        Commands::Config(cmd) => config_cmd::run(&ctx, cmd).await?,
        Commands::Serve { port } => run_server(&ctx, port).await?,
    }

    Ok(())
}

async fn run_server(ctx: &CliContext, port: Option<u16>) -> Result<()> {
    let caps = Capabilities::from_config(&ctx.config)?;
    let addr = ctx.viewer_addr(port);
    info!(addr = %addr, history = caps.history.name(), "Starting result viewer");

    let app = api::build_router(caps.history);
    let listener = TcpListener::bind(&addr).await?;
    println!("Viewer listening on http://{addr}/api/history");

    axum::serve(listener, app).await?;
    Ok(())
}
