//! # Storage Area
//!
//! The ordered key/value engine behind one storage area. Each mutation runs
//! as a single critical section (read, quota check, write) under the area's
//! lock, then hands a mutation record to the broadcast dispatcher after the
//! lock is released. Broadcast is best-effort: delivery failures never affect
//! the result of the mutating call.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broadcast::{Dispatcher, MutationRecord};

use super::config::StorageConfig;
use super::errors::{StorageError, StorageResult};

/// Storage class partition: "local" vs "session".
///
/// Both classes behave identically in this core; the tag only partitions
/// areas for provisioning and broadcast sibling matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    /// Logically persists across sessions
    Local,
    /// Logically scoped to one session
    Session,
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageClass::Local => write!(f, "local"),
            StorageClass::Session => write!(f, "session"),
        }
    }
}

/// Interior map state, guarded by one lock per area.
///
/// Keys live in both structures: `order` holds iteration order (a key keeps
/// its slot when its value is updated), `values` holds the current value.
#[derive(Debug, Default)]
struct AreaState {
    order: Vec<String>,
    values: HashMap<String, String>,
    /// Running total of value byte lengths, kept in sync with `values`
    value_bytes: usize,
}

/// One origin-scoped, insertion-ordered string map.
#[derive(Debug)]
pub struct StorageArea {
    id: Uuid,
    class: StorageClass,
    origin: String,
    quota_bytes: usize,
    state: RwLock<AreaState>,
    dispatcher: Arc<Dispatcher>,
}

impl StorageArea {
    /// Direct construction is not allowed: areas exist once per
    /// (class, origin) slot and must be provisioned through a
    /// [`StorageHost`](crate::host::StorageHost).
    pub fn new() -> StorageResult<Self> {
        Err(StorageError::IllegalConstruction)
    }

    /// Real constructor, reachable only through provisioning.
    pub(crate) fn provisioned(
        class: StorageClass,
        origin: String,
        config: &StorageConfig,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            class,
            origin,
            quota_bytes: config.quota_bytes,
            state: RwLock::new(AreaState::default()),
            dispatcher,
        }
    }

    /// Opaque identity of this area (equality, broadcast self-exclusion)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Storage class tag
    pub fn class(&self) -> StorageClass {
        self.class
    }

    /// Origin this area is scoped to (immutable for the area's lifetime)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Configured quota in value bytes
    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.order.len()).unwrap_or(0)
    }

    /// True if the area holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current total UTF-8 byte length of all stored values
    pub fn used_bytes(&self) -> usize {
        self.state.read().map(|s| s.value_bytes).unwrap_or(0)
    }

    /// Returns the key at ordinal `index` in iteration order.
    ///
    /// Negative indices return `None` without wrapping. Indices at or above
    /// 2^32 are reduced modulo 2^32 before the bounds check, so
    /// `key(2^32) == key(0)`. This matches conformance-test-verified
    /// browser behavior rather than naive bounds checking.
    pub fn key(&self, index: i64) -> Option<String> {
        if index < 0 {
            return None;
        }
        let wrapped = (index as u64 % (1u64 << 32)) as usize;
        let state = self.state.read().ok()?;
        state.order.get(wrapped).cloned()
    }

    /// Returns the value for `key`, or `None` if absent
    pub fn get_item(&self, key: &str) -> Option<String> {
        let state = self.state.read().ok()?;
        state.values.get(key).cloned()
    }

    /// All keys in iteration order (property enumeration support)
    pub fn keys(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.order.clone())
            .unwrap_or_default()
    }

    /// Insert or update an entry.
    ///
    /// Setting a key to exactly its current value is a no-op: no mutation,
    /// no broadcast. Otherwise the prospective total value byte length is
    /// checked against the quota before anything is written; on
    /// [`StorageError::QuotaExceeded`] the map is left untouched and no
    /// notification is emitted. Updates keep the key's ordinal position;
    /// new keys append at the end.
    pub fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let record = {
            let mut state = self
                .state
                .write()
                .map_err(|_| StorageError::Internal("lock poisoned".into()))?;

            let old_value = state.values.get(key).cloned();
            if old_value.as_deref() == Some(value) {
                return Ok(());
            }

            let old_bytes = old_value.as_ref().map(|v| v.len()).unwrap_or(0);
            let prospective = state.value_bytes - old_bytes + value.len();
            if prospective > self.quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    requested: prospective,
                    limit: self.quota_bytes,
                });
            }

            if old_value.is_none() {
                state.order.push(key.to_string());
            }
            state.values.insert(key.to_string(), value.to_string());
            state.value_bytes = prospective;

            MutationRecord::set(self.id, self.class, &self.origin, key, old_value, value)
        };

        self.dispatcher.dispatch(record);
        Ok(())
    }

    /// Delete an entry.
    ///
    /// An absent key is a defined no-op: not an error, and no broadcast.
    pub fn remove_item(&self, key: &str) -> StorageResult<()> {
        let record = {
            let mut state = self
                .state
                .write()
                .map_err(|_| StorageError::Internal("lock poisoned".into()))?;

            let Some(old_value) = state.values.remove(key) else {
                return Ok(());
            };
            state.order.retain(|k| k != key);
            state.value_bytes -= old_value.len();

            MutationRecord::remove(self.id, self.class, &self.origin, key, old_value)
        };

        self.dispatcher.dispatch(record);
        Ok(())
    }

    /// Empty the area.
    ///
    /// Always emits exactly one `{key: None, old: None, new: None}`
    /// notification, even when the area was already empty.
    pub fn clear(&self) -> StorageResult<()> {
        {
            let mut state = self
                .state
                .write()
                .map_err(|_| StorageError::Internal("lock poisoned".into()))?;
            state.order.clear();
            state.values.clear();
            state.value_bytes = 0;
        }

        self.dispatcher
            .dispatch(MutationRecord::clear(self.id, self.class, &self.origin));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::AreaRegistry;

    fn test_area(quota_bytes: usize) -> StorageArea {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(AreaRegistry::new())));
        StorageArea::provisioned(
            StorageClass::Local,
            "origin-test".to_string(),
            &StorageConfig { quota_bytes },
            dispatcher,
        )
    }

    #[test]
    fn test_direct_construction_is_illegal() {
        assert_eq!(
            StorageArea::new().unwrap_err(),
            StorageError::IllegalConstruction
        );
    }

    #[test]
    fn test_set_then_get() {
        let area = test_area(1024);
        area.set_item("key", "value").unwrap();
        assert_eq!(area.get_item("key").as_deref(), Some("value"));
        assert_eq!(area.len(), 1);
    }

    #[test]
    fn test_get_absent_returns_none() {
        let area = test_area(1024);
        assert_eq!(area.get_item("nonexistent"), None);
    }

    #[test]
    fn test_update_keeps_ordinal_position() {
        let area = test_area(1024);
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        area.set_item("c", "3").unwrap();

        area.set_item("a", "updated").unwrap();

        assert_eq!(area.key(0).as_deref(), Some("a"));
        assert_eq!(area.key(1).as_deref(), Some("b"));
        assert_eq!(area.key(2).as_deref(), Some("c"));
        assert_eq!(area.get_item("a").as_deref(), Some("updated"));
    }

    #[test]
    fn test_remove_and_readd_moves_to_end() {
        let area = test_area(1024);
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        area.remove_item("a").unwrap();
        area.set_item("a", "1").unwrap();

        assert_eq!(area.key(0).as_deref(), Some("b"));
        assert_eq!(area.key(1).as_deref(), Some("a"));
    }

    #[test]
    fn test_key_index_semantics() {
        let area = test_area(1024);
        area.set_item("first", "1").unwrap();
        area.set_item("second", "2").unwrap();

        assert_eq!(area.key(-1), None);
        assert_eq!(area.key(2), None);
        assert_eq!(area.key(1000), None);
        // Indices >= 2^32 wrap
        assert_eq!(area.key(1 << 32), area.key(0));
        assert_eq!(area.key((1 << 32) + 1).as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let area = test_area(1024);
        area.set_item("a", "1").unwrap();
        area.remove_item("nonexistent").unwrap();
        assert_eq!(area.len(), 1);
    }

    #[test]
    fn test_quota_exact_fit_succeeds() {
        let area = test_area(10);
        area.set_item("a", "12345").unwrap();
        area.set_item("b", "12345").unwrap();
        assert_eq!(area.used_bytes(), 10);
    }

    #[test]
    fn test_quota_exceeded_is_atomic() {
        let area = test_area(10);
        area.set_item("a", "12345").unwrap();

        let err = area.set_item("b", "123456").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                requested: 11,
                limit: 10
            }
        );

        // State unchanged
        assert_eq!(area.len(), 1);
        assert_eq!(area.get_item("a").as_deref(), Some("12345"));
        assert_eq!(area.get_item("b"), None);
        assert_eq!(area.used_bytes(), 5);
    }

    #[test]
    fn test_quota_counts_values_not_keys() {
        let area = test_area(5);
        // Key is longer than the quota; only the value counts
        area.set_item("a-very-long-key-name", "12345").unwrap();
        assert_eq!(area.used_bytes(), 5);
    }

    #[test]
    fn test_quota_counts_utf8_bytes() {
        let area = test_area(5);
        // Three-byte UTF-8 scalar plus two ASCII bytes fills the quota
        area.set_item("k", "\u{20AC}ab").unwrap();
        assert_eq!(area.used_bytes(), 5);
        assert!(matches!(
            area.set_item("k2", "x"),
            Err(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn test_overwrite_frees_old_value_bytes() {
        let area = test_area(10);
        area.set_item("a", "123456789").unwrap();
        // Replacing the value reuses its budget
        area.set_item("a", "abcdefghij").unwrap();
        assert_eq!(area.used_bytes(), 10);
    }

    #[test]
    fn test_clear_empties_area() {
        let area = test_area(1024);
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        area.clear().unwrap();

        assert!(area.is_empty());
        assert_eq!(area.used_bytes(), 0);
        assert_eq!(area.key(0), None);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let area = test_area(1024);
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        area.remove_item("a").unwrap();

        assert_eq!(area.len(), 1);
        assert_eq!(area.key(0).as_deref(), Some("b"));
        assert_eq!(area.get_item("a"), None);
    }
}
