//! # Storage Errors
//!
//! Error types for the storage engine and the property facade.

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Prospective value bytes would exceed the area's quota
    #[error("quota exceeded: {requested} value bytes requested, limit is {limit}")]
    QuotaExceeded {
        /// Total value bytes the operation would have produced
        requested: usize,
        /// Configured quota in bytes
        limit: usize,
    },

    /// A key or value could not be coerced to a string representation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A dynamic call was missing required arguments
    #[error("{method}: at least {required} argument(s) required, but only {provided} passed")]
    MissingArgument {
        /// Method that was invoked
        method: &'static str,
        /// Number of arguments the method requires
        required: usize,
        /// Number of arguments actually passed
        provided: usize,
    },

    /// A dynamic call named a method that does not exist
    #[error("no such method: {0}")]
    NoSuchMethod(String),

    /// An area was constructed without going through provisioning
    #[error("illegal constructor: storage areas are provisioned per (class, origin) slot")]
    IllegalConstruction,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
