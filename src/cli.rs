//! CLI definitions for FocusFlow.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use focusflow_protocols::Grade;

/// FocusFlow CLI.
#[derive(Parser)]
#[command(name = "focusflow")]
#[command(about = "Reading-level text simplification with caching and a local fallback")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Never contact the remote service; answer with the local rules only
    #[arg(long, global = true)]
    pub local: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check whether the remote service is reachable
    Probe,

    /// Simplify a piece of text
    Simplify {
        /// Reading grade (2, 3, 4, 5, 6 or 8; default from config)
        #[arg(short, long)]
        grade: Option<Grade>,

        /// Page session id sent with the request
        #[arg(long)]
        page_id: Option<String>,

        /// Text to simplify (read from stdin when omitted)
        text: Option<String>,
    },

    /// Simplify every text block of a JSON page description
    Page {
        /// Path to the page JSON
        file: PathBuf,

        /// Reading grade (default from config)
        #[arg(short, long)]
        grade: Option<Grade>,
    },

    /// Warm the cache for every text block of a JSON page description
    Precache {
        /// Path to the page JSON
        file: PathBuf,

        /// Reading grade (default from config)
        #[arg(short, long)]
        grade: Option<Grade>,
    },

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Show the backend and number of entries
    Stats,

    /// Remove every entry
    Clear,
}
