//! FocusFlow - reading-level text simplification
//!
//! Main entry point for the FocusFlow CLI.

mod cli;
mod cmd_cache;
mod cmd_simplify;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use pipeline::{load_config, Pipeline};

/// Get the FocusFlow data directory (~/.focusflow).
fn focusflow_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".focusflow")
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = focusflow_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("focusflow")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console goes to stderr so stdout carries only command output.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    info!(config = %cli.config.display(), local = cli.local, "Starting FocusFlow");

    match cli.command {
        Commands::Cache { action } => cmd_cache::handle_cache_command(&config.cache, action).await,
        Commands::Probe => cmd_simplify::probe(Pipeline::build(config, cli.local).await?).await,
        Commands::Simplify {
            grade,
            page_id,
            text,
        } => {
            let pipeline = Pipeline::build(config, cli.local).await?;
            cmd_simplify::simplify(pipeline, grade, page_id, text).await
        }
        Commands::Page { file, grade } => {
            let pipeline = Pipeline::build(config, cli.local).await?;
            cmd_simplify::page(pipeline, &file, grade).await
        }
        Commands::Precache { file, grade } => {
            let pipeline = Pipeline::build(config, cli.local).await?;
            cmd_simplify::precache(pipeline, &file, grade).await
        }
    }
}
