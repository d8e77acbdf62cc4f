//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use warden_core::DomainError;

/// Convert an SQLx error to a DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Create a "list not found" error
pub fn list_not_found(id: i32) -> DomainError {
    DomainError::ListNotFound(id)
}

/// Create a "record not found" error
pub fn record_not_found(id: i64) -> DomainError {
    DomainError::RecordNotFound(id)
}

/// Bit of the given 1-based server number, as a bindable column value.
pub fn server_bit(server: u8) -> i64 {
    if (1..=32).contains(&server) {
        1i64 << (server - 1)
    } else {
        0
    }
}
