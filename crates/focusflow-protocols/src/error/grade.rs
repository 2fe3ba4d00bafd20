//! Reading grade errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("Invalid reading grade {0}: expected one of 2, 3, 4, 5, 6, 8")]
    OutOfSet(i64),

    #[error("Invalid reading grade: {0:?}")]
    Unparseable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_set_lists_allowed_values() {
        let err = GradeError::OutOfSet(7);
        let display = err.to_string();
        assert!(display.contains('7'));
        assert!(display.contains("2, 3, 4, 5, 6, 8"));
    }

    #[test]
    fn test_unparseable() {
        let err = GradeError::Unparseable("three".to_string());
        assert!(err.to_string().contains("three"));
    }
}
