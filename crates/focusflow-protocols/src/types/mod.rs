//! Common types used across the FocusFlow pipeline.

mod settings;
mod text;

pub use settings::*;
pub use text::*;
