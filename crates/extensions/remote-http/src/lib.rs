//! HTTP client for the FocusFlow rewriting service.

mod api;
mod client;

pub use client::{derive_health_url, HttpRemoteClient};
