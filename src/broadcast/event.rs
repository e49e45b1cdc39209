//! # Broadcast Events
//!
//! Mutation records produced by the storage engine and the notifications
//! delivered to subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::storage::{StorageArea, StorageClass};

/// Ephemeral record of one successful engine mutation.
///
/// Produced by every mutating operation (including `clear`, where all three
/// payload fields are `None`), consumed immediately by the dispatcher, then
/// discarded. Never stored.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// Key that changed; `None` for `clear`
    pub key: Option<String>,
    /// Value before the mutation; `None` for inserts and `clear`
    pub old_value: Option<String>,
    /// Value after the mutation; `None` for removals and `clear`
    pub new_value: Option<String>,
    /// Identity of the mutating area (excluded from its own broadcast)
    pub source_id: Uuid,
    /// Class of the mutating area
    pub class: StorageClass,
    /// Origin of the mutating area
    pub origin: String,
}

impl MutationRecord {
    /// Record for an insert or update
    pub fn set(
        source_id: Uuid,
        class: StorageClass,
        origin: &str,
        key: &str,
        old_value: Option<String>,
        new_value: &str,
    ) -> Self {
        Self {
            key: Some(key.to_string()),
            old_value,
            new_value: Some(new_value.to_string()),
            source_id,
            class,
            origin: origin.to_string(),
        }
    }

    /// Record for a removal
    pub fn remove(
        source_id: Uuid,
        class: StorageClass,
        origin: &str,
        key: &str,
        old_value: String,
    ) -> Self {
        Self {
            key: Some(key.to_string()),
            old_value: Some(old_value),
            new_value: None,
            source_id,
            class,
            origin: origin.to_string(),
        }
    }

    /// Record for a clear (all payload fields `None`)
    pub fn clear(source_id: Uuid, class: StorageClass, origin: &str) -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
            source_id,
            class,
            origin: origin.to_string(),
        }
    }
}

/// Change notification delivered to subscribers.
///
/// `url` is the origin of the MUTATING area; `area` is the sibling area the
/// notification is addressed to, so a subscriber watching the process-wide
/// channel can tell which area was affected.
#[derive(Debug, Clone)]
pub struct StorageNotification {
    /// Key that changed; `None` for `clear`
    pub key: Option<String>,
    /// Value before the mutation
    pub old_value: Option<String>,
    /// Value after the mutation
    pub new_value: Option<String>,
    /// Origin of the area the mutation happened on
    pub url: String,
    /// The affected sibling area
    pub area: Arc<StorageArea>,
    /// When the notification was produced
    pub timestamp: DateTime<Utc>,
}

impl StorageNotification {
    pub(crate) fn from_record(record: &MutationRecord, area: Arc<StorageArea>) -> Self {
        Self {
            key: record.key.clone(),
            old_value: record.old_value.clone(),
            new_value: record.new_value.clone(),
            url: record.origin.clone(),
            area,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to a StorageEvent-shaped wire format
    pub fn to_wire_format(&self) -> Value {
        serde_json::json!({
            "type": "storage",
            "payload": {
                "key": self.key,
                "oldValue": self.old_value,
                "newValue": self.new_value,
                "url": self.url,
                "storageArea": self.area.id().to_string(),
                "class": self.area.class().to_string(),
                "timestamp": self.timestamp.to_rfc3339(),
            }
        })
    }
}
