//! # FocusFlow Core
//!
//! The simplification pipeline proper.
//!
//! ## Components
//!
//! - [`FallbackSimplifier`] - Local rule-based rewriting, used when the remote service fails
//! - [`Coordinator`] - Cache-first routing between the cache, the remote service and the fallback
//! - [`PrecomputeHandle`] - Background warming of the cache for the other grades
//! - [`SimplifierService`] / [`SimplifierHandle`] - Channel-based request/response front end
//! - [`PageAdapter`] - Finds text blocks in a [`PageTree`] and splices results back in

pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod offline;
pub mod page;
pub mod precompute;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Coordinator, CoordinatorOptions, PreCacheReport};
pub use error::ServiceError;
pub use fallback::FallbackSimplifier;
pub use offline::OfflineRemote;
pub use page::{AdapterOptions, Availability, NodeId, PageAdapter, PageTree, TextUnit};
pub use precompute::{PrecomputeHandle, PrecomputeRegistry, PrecomputeReport};
pub use service::{ServiceOptions, SimplifierHandle, SimplifierService};
