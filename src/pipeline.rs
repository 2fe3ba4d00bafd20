//! Builds the cache, remote client and coordinator from configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use focusflow_cache::{MemoryCacheStore, SqliteCacheStore};
use focusflow_config::{
    CacheBackend, CacheConfig, Config, ConfigLoader, ConfigValidator, RemoteConfig,
};
use focusflow_core::{Coordinator, CoordinatorOptions, OfflineRemote, ServiceOptions};
use focusflow_protocols::error::{CacheError, RemoteError};
use focusflow_protocols::{CacheStore, EvictionPolicy, Grade, RemoteSimplifier};
use focusflow_remote_http::HttpRemoteClient;

/// Load and validate the configuration. A missing file means defaults.
pub(crate) fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let result = ConfigValidator::ensure_valid(&config)?;
    for warning in &result.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(config)
}

pub(crate) async fn open_cache(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    let policy = EvictionPolicy::from_max_entries(config.max_entries);
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheStore::with_policy(policy))),
        CacheBackend::Sqlite => {
            let path = config.resolved_path();
            info!(path = %path.display(), ?policy, "Opening cache");
            Ok(Arc::new(SqliteCacheStore::open_with_policy(path, policy).await?))
        }
    }
}

pub(crate) fn build_remote(
    config: &RemoteConfig,
    local: bool,
) -> Result<Arc<dyn RemoteSimplifier>, RemoteError> {
    if local {
        info!("Running offline, remote service disabled");
        return Ok(Arc::new(OfflineRemote::new()));
    }
    let client = HttpRemoteClient::from_config(config)?;
    info!(base_url = %client.base_url(), health_url = %client.health_url(), "Using remote service");
    Ok(Arc::new(client))
}

/// Everything a command needs.
pub(crate) struct Pipeline {
    pub config: Config,
    pub cache: Arc<dyn CacheStore>,
    pub coordinator: Coordinator,
}

impl Pipeline {
    pub async fn build(config: Config, local: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let cache = open_cache(&config.cache).await?;
        let remote = build_remote(&config.remote, local)?;
        let coordinator = Coordinator::new(
            cache.clone(),
            remote,
            CoordinatorOptions::from(&config.simplifier),
        );
        Ok(Self {
            config,
            cache,
            coordinator,
        })
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions::from_config(&self.config.service, self.config.simplifier.precompute_enabled)
    }

    /// `requested` if given, else the configured grade.
    pub fn grade(&self, requested: Option<Grade>) -> Result<Grade, Box<dyn std::error::Error>> {
        match requested {
            Some(grade) => Ok(grade),
            None => Ok(Grade::new(self.config.simplifier.grade)?),
        }
    }
}
