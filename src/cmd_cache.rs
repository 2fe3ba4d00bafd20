//! Cache subcommand handlers.

use tracing::info;

use focusflow_config::{CacheBackend, CacheConfig};
use focusflow_protocols::EvictionPolicy;

use crate::cli::CacheAction;
use crate::pipeline::open_cache;

/// Handle cache subcommands.
pub(crate) async fn handle_cache_command(
    config: &CacheConfig,
    action: CacheAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = open_cache(config).await?;
    match action {
        CacheAction::Stats => {
            let entries = cache.len().await?;
            let location = match config.backend {
                CacheBackend::Sqlite => config.resolved_path().display().to_string(),
                CacheBackend::Memory => "in-process".to_string(),
            };
            let limit = match EvictionPolicy::from_max_entries(config.max_entries) {
                EvictionPolicy::Unbounded => "unbounded".to_string(),
                EvictionPolicy::Lru { max_entries } => format!("lru, max {max_entries}"),
            };
            println!("backend:  {} ({})", cache.id(), location);
            println!("policy:   {limit}");
            println!("entries:  {entries}");
        }
        CacheAction::Clear => {
            let removed = cache.len().await?;
            cache.clear().await?;
            info!(removed, "Cache cleared");
            println!("removed {removed} entr{}", if removed == 1 { "y" } else { "ies" });
        }
    }
    Ok(())
}
