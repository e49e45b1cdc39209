//! # Origin Resolution
//!
//! Produces the stable identifier used to partition storage areas.
//! Sibling areas (broadcast peers) are matched by (class, origin).

use sha2::{Digest, Sha256};

/// Resolves the origin string for the current execution context.
///
/// Implementations must be deterministic for the lifetime of the process:
/// two calls on the same resolver always return the same string.
pub trait OriginResolver: Send + Sync {
    /// Returns the origin of the current document/process context.
    fn current_origin(&self) -> String;
}

/// Default resolver: a SHA-256 digest of a process-identifying value
/// (executable path + pid), computed once at construction.
#[derive(Debug, Clone)]
pub struct ProcessOrigin {
    digest: String,
}

impl ProcessOrigin {
    /// Create a resolver bound to the current process.
    pub fn new() -> Self {
        let exe = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| String::from("webstore"));

        let mut hasher = Sha256::new();
        hasher.update(exe.as_bytes());
        hasher.update(std::process::id().to_le_bytes());

        let digest = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        Self { digest }
    }
}

impl Default for ProcessOrigin {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginResolver for ProcessOrigin {
    fn current_origin(&self) -> String {
        self.digest.clone()
    }
}

/// Fixed origin for tests and embedders that partition storage themselves.
#[derive(Debug, Clone)]
pub struct FixedOrigin(String);

impl FixedOrigin {
    /// Create a resolver that always returns `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }
}

impl OriginResolver for FixedOrigin {
    fn current_origin(&self) -> String {
        self.0.clone()
    }
}
