//! # Storage Configuration

/// Per-area configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Maximum total UTF-8 byte length of all stored values.
    /// Keys do not count against the quota.
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: 5_000_000,
        }
    }
}
