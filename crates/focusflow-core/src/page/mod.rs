//! Page-side integration: a small document tree, block discovery, and the
//! adapter that swaps text in and out.

mod adapter;
mod discover;
mod tree;

pub use adapter::{AdapterOptions, Availability, PageAdapter, TextUnit};
pub use discover::{discover, CATEGORIES};
pub use tree::{NodeId, NodeDesc, PageTree};
