//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_cache;
mod schema_pipeline;
mod schema_remote;

pub use schema_cache::*;
pub use schema_pipeline::*;
pub use schema_remote::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub simplifier: SimplifierConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
