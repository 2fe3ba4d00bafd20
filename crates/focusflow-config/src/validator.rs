//! Configuration validation.

use url::Url;

use crate::error::ConfigError;
use crate::schema::{CacheBackend, Config};

/// Reading grades the pipeline understands.
pub const SUPPORTED_GRADES: [u8; 6] = [2, 3, 4, 5, 6, 8];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_remote(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_simplifier(config, &mut result);
        Self::validate_service(config, &mut result);

        Ok(result)
    }

    /// Validate and turn the first error into a `ConfigError`.
    pub fn ensure_valid(config: &Config) -> Result<ValidationResult, ConfigError> {
        let result = Self::validate(config)?;
        if let Some(first) = result.errors.first() {
            return Err(ConfigError::InvalidValue {
                field: first.path.clone(),
                message: first.message.clone(),
            });
        }
        Ok(result)
    }

    fn validate_remote(config: &Config, result: &mut ValidationResult) {
        Self::validate_http_url("remote.base_url", &config.remote.base_url, result);

        if let Some(ref health_url) = config.remote.health_url {
            Self::validate_http_url("remote.health_url", health_url, result);
        }

        if config.remote.probe_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "remote.probe_timeout_ms",
                "probe_timeout_ms must be greater than 0",
            ));
        }

        if config.remote.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "remote.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_http_url(path: &str, value: &str, result: &mut ValidationResult) {
        match Url::parse(value) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(_) => result.add_error(ValidationError::new(
                path,
                "URL must start with http:// or https://",
            )),
            Err(e) => result.add_error(ValidationError::new(
                path,
                format!("Invalid URL '{}': {}", value, e),
            )),
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        if config.cache.backend == CacheBackend::Sqlite
            && config.cache.path.as_os_str().is_empty()
        {
            result.add_error(ValidationError::new(
                "cache.path",
                "SQLite cache path cannot be empty",
            ));
        }

        if config.cache.max_entries > 0 && config.cache.max_entries < 100 {
            result.add_warning(ValidationWarning::new(
                "cache.max_entries",
                "max_entries is very low (<100), most pages will evict their own entries",
            ));
        }
    }

    fn validate_simplifier(config: &Config, result: &mut ValidationResult) {
        if !SUPPORTED_GRADES.contains(&config.simplifier.grade) {
            result.add_error(ValidationError::new(
                "simplifier.grade",
                format!(
                    "grade {} is not supported, valid values: {:?}",
                    config.simplifier.grade, SUPPORTED_GRADES
                ),
            ));
        }

        if config.simplifier.batch_size == 0 {
            result.add_error(ValidationError::new(
                "simplifier.batch_size",
                "batch_size must be greater than 0",
            ));
        }

        if config.simplifier.precompute_enabled && config.simplifier.precompute_pacing_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "simplifier.precompute_pacing_ms",
                "precompute pacing is disabled, background jobs will send requests back to back",
            ));
        }
    }

    fn validate_service(config: &Config, result: &mut ValidationResult) {
        if config.service.channel_capacity == 0 {
            result.add_error(ValidationError::new(
                "service.channel_capacity",
                "channel_capacity must be greater than 0",
            ));
        }

        if config.service.reply_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "service.reply_timeout_secs",
                "reply_timeout_secs must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
