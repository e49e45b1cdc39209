//! # Storage Engine
//!
//! One insertion-ordered key/value map per storage area, with the Web
//! Storage read/write/delete/enumerate contract:
//!
//! - Updating an existing key keeps its ordinal position
//! - Setting a key to its current value is a no-op (no broadcast)
//! - Quota is measured over value bytes only, checked before any write
//! - Removing an absent key is a defined no-op, never an error
//! - `clear` always emits exactly one notification

mod area;
mod config;
mod errors;

pub use area::{StorageArea, StorageClass};
pub use config::StorageConfig;
pub use errors::{StorageError, StorageResult};
