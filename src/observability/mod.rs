//! # Observability
//!
//! Structured logging for the broadcast and provisioning paths:
//! - one JSON line per event
//! - deterministic field ordering
//! - synchronous writes, no buffering

mod logger;

pub use logger::{Logger, Severity};
