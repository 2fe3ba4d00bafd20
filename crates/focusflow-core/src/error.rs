//! Messaging service errors.

use std::time::Duration;

use thiserror::Error;

/// Failure to get an answer out of the [`SimplifierService`](crate::SimplifierService).
///
/// Only the page adapter sees these; it answers with local fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Simplifier service is not running")]
    Closed,

    #[error("Simplifier service dropped the reply")]
    ReplyDropped,

    #[error("No reply from simplifier service within {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        assert!(ServiceError::Closed.to_string().contains("not running"));
        assert!(ServiceError::ReplyDropped.to_string().contains("dropped"));

        let err = ServiceError::Timeout(Duration::from_secs(120));
        assert!(err.to_string().contains("120s"));
    }
}
