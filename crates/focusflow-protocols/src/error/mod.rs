//! Error types for the FocusFlow protocol layer.

mod cache;
mod grade;
mod remote;

pub use cache::*;
pub use grade::*;
pub use remote::*;
