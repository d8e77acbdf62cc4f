//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("List not found: {0}")]
    ListNotFound(i32),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("The default list cannot be deleted")]
    DefaultListProtected,

    #[error("Unknown sync method: {0}")]
    InvalidSyncMethod(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Check if this is a "not found" error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ListNotFound(_) | Self::RecordNotFound(_))
    }

    /// Check if this is a rule violation the caller should be told about
    /// synchronously (never published to the bus)
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::DefaultListProtected | Self::InvalidSyncMethod(_) | Self::ValidationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::ListNotFound(7).is_not_found());
        assert!(DomainError::RecordNotFound(9).is_not_found());
        assert!(!DomainError::DefaultListProtected.is_not_found());
    }

    #[test]
    fn test_invariant_violations() {
        assert!(DomainError::DefaultListProtected.is_invariant_violation());
        assert!(!DomainError::DatabaseError("boom".to_string()).is_invariant_violation());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DomainError::ListNotFound(3).to_string(), "List not found: 3");
        assert_eq!(
            DomainError::DefaultListProtected.to_string(),
            "The default list cannot be deleted"
        );
    }
}
