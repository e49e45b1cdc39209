//! # Area Registry
//!
//! Process-wide, append-only list of all storage areas created during the
//! process lifetime. Supplies the candidate set for sibling matching.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::storage::{StorageArea, StorageClass};

use super::errors::{BroadcastError, BroadcastResult};

/// Append-only registry of live storage areas.
///
/// Entries are never removed; areas live for the process lifetime and are
/// emptied with `clear` rather than destroyed.
#[derive(Debug, Default)]
pub struct AreaRegistry {
    areas: RwLock<Vec<Arc<StorageArea>>>,
}

impl AreaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an area to the registry
    pub fn register(&self, area: Arc<StorageArea>) -> BroadcastResult<()> {
        let mut areas = self
            .areas
            .write()
            .map_err(|_| BroadcastError::Internal("lock poisoned".into()))?;
        areas.push(area);
        Ok(())
    }

    /// Number of registered areas (double registrations included)
    pub fn len(&self) -> usize {
        self.areas.read().map(|a| a.len()).unwrap_or(0)
    }

    /// True if no area has been registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All areas matching (class, origin), in registration order.
    ///
    /// The result is deduplicated by area identity, so a double registration
    /// caused by adapter code yields one entry and the exclusion below holds
    /// even for duplicated areas. When `excluding` is set, the area with
    /// that id is filtered out.
    pub fn find_siblings(
        &self,
        class: StorageClass,
        origin: &str,
        excluding: Option<Uuid>,
    ) -> BroadcastResult<Vec<Arc<StorageArea>>> {
        let areas = self
            .areas
            .read()
            .map_err(|_| BroadcastError::Internal("lock poisoned".into()))?;

        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut siblings = Vec::new();

        for area in areas.iter() {
            if area.class() != class || area.origin() != origin {
                continue;
            }
            if excluding == Some(area.id()) {
                continue;
            }
            if seen.insert(area.id()) {
                siblings.push(Arc::clone(area));
            }
        }

        Ok(siblings)
    }
}
