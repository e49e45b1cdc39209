//! # Broadcast Errors

use thiserror::Error;

/// Result type for broadcast operations
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Broadcast errors.
///
/// These never propagate into the mutation call path; the dispatcher logs
/// and swallows them. They surface only through the registry's own API.
#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
