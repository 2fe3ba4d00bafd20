//! Simplifier and messaging service configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Simplification pipeline tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifierConfig {
    /// Reading grade used when a request does not name one.
    #[serde(default = "default_grade")]
    pub grade: u8,

    /// Items per remote batch call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Text units shorter than this (after trimming) are left alone.
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Warm the cache for the other grades after a single simplification.
    #[serde(default = "default_true")]
    pub precompute_enabled: bool,

    /// Delay between background precompute requests, in milliseconds.
    #[serde(default = "default_precompute_pacing_ms")]
    pub precompute_pacing_ms: u64,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            grade: default_grade(),
            batch_size: default_batch_size(),
            min_text_length: default_min_text_length(),
            precompute_enabled: default_true(),
            precompute_pacing_ms: default_precompute_pacing_ms(),
        }
    }
}

fn default_grade() -> u8 {
    3
}

fn default_batch_size() -> usize {
    10
}

fn default_min_text_length() -> usize {
    20
}

fn default_precompute_pacing_ms() -> u64 {
    1500
}

/// Messaging service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Capacity of the request channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// How long a caller waits for a reply, in seconds.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

fn default_reply_timeout_secs() -> u64 {
    120
}
