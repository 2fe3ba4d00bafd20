//! # FocusFlow Protocols
//!
//! Core protocol definitions for the FocusFlow simplification pipeline.
//! Contains only types and interface definitions - no I/O.
//!
//! ## Core Traits
//!
//! - [`CacheStore`] - Durable fingerprint -> simplified text storage
//! - [`RemoteSimplifier`] - Remote rewriting service client

pub mod cache;
pub mod error;
pub mod grade;
pub mod remote;
pub mod types;

pub use cache::{normalize_text, CacheEntry, CacheKey, CacheStore, EvictionPolicy};
pub use error::{CacheError, GradeError, RemoteError};
pub use grade::Grade;
pub use remote::RemoteSimplifier;
pub use types::*;
