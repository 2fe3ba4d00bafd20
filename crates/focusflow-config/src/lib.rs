//! # FocusFlow Config
//!
//! Configuration management for the FocusFlow simplification pipeline.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{
    ConfigValidator, SUPPORTED_GRADES, ValidationError, ValidationResult, ValidationWarning,
};
