//! Synchronization engine error types

use thiserror::Error;

use warden_bus::{CodecError, RedisPoolError};
use warden_core::{DomainError, GameClientError};

/// Error type spanning the synchronization pipeline
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Game server error: {0}")]
    Game(#[from] GameClientError),

    #[error("Bus error: {0}")]
    Bus(#[from] RedisPoolError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Check if this is an invariant violation the admin caller must see
    /// synchronously
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_invariant_violation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_conversion() {
        let err: SyncError = DomainError::DefaultListProtected.into();
        assert!(err.is_invariant_violation());

        let err: SyncError = DomainError::DatabaseError("down".to_string()).into();
        assert!(!err.is_invariant_violation());
    }
}
