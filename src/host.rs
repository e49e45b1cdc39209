//! # Storage Host
//!
//! Per-(class, origin) provisioning. The host is the only way to obtain a
//! [`StorageArea`]: the first request for a (class, origin) slot creates and
//! registers the area, every later request returns the same `Arc`. Areas
//! live for the process lifetime.
//!
//! The host is explicit, injectable state, not an ambient global. Hosts can
//! share a dispatcher (and through it a registry) to model multiple
//! documents of one process broadcasting to each other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::broadcast::{AreaRegistry, Dispatcher, NotificationReceiver};
use crate::observability::Logger;
use crate::origin::{OriginResolver, ProcessOrigin};
use crate::storage::{StorageArea, StorageClass, StorageConfig, StorageError, StorageResult};

/// Provisions storage areas for one origin context.
pub struct StorageHost {
    config: StorageConfig,
    resolver: Arc<dyn OriginResolver>,
    dispatcher: Arc<Dispatcher>,
    slots: RwLock<HashMap<(StorageClass, String), Arc<StorageArea>>>,
}

impl StorageHost {
    /// Host with the default process origin and its own registry/dispatcher
    pub fn new(config: StorageConfig) -> Self {
        Self::with_resolver(config, Arc::new(ProcessOrigin::new()))
    }

    /// Host with a custom origin resolver
    pub fn with_resolver(config: StorageConfig, resolver: Arc<dyn OriginResolver>) -> Self {
        let registry = Arc::new(AreaRegistry::new());
        Self::with_dispatcher(config, resolver, Arc::new(Dispatcher::new(registry)))
    }

    /// Host sharing an existing dispatcher (and its registry) with other
    /// hosts, so their areas become broadcast siblings.
    pub fn with_dispatcher(
        config: StorageConfig,
        resolver: Arc<dyn OriginResolver>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            config,
            resolver,
            dispatcher,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the area for `class` at this host's origin.
    ///
    /// The area is created and registered exactly once per slot; repeat
    /// calls return the same `Arc`.
    pub fn area(&self, class: StorageClass) -> StorageResult<Arc<StorageArea>> {
        let origin = self.resolver.current_origin();

        {
            let slots = self
                .slots
                .read()
                .map_err(|_| StorageError::Internal("lock poisoned".into()))?;
            if let Some(area) = slots.get(&(class, origin.clone())) {
                return Ok(Arc::clone(area));
            }
        }

        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::Internal("lock poisoned".into()))?;

        // Another caller may have provisioned the slot between the guards
        if let Some(area) = slots.get(&(class, origin.clone())) {
            return Ok(Arc::clone(area));
        }

        let area = Arc::new(StorageArea::provisioned(
            class,
            origin.clone(),
            &self.config,
            Arc::clone(&self.dispatcher),
        ));
        self.dispatcher
            .registry()
            .register(Arc::clone(&area))
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        Logger::info(
            "AREA_PROVISIONED",
            &[("class", &class.to_string()), ("origin", &origin)],
        );

        slots.insert((class, origin), Arc::clone(&area));
        Ok(area)
    }

    /// The "local" storage area for this host's origin
    pub fn local_storage(&self) -> StorageResult<Arc<StorageArea>> {
        self.area(StorageClass::Local)
    }

    /// The "session" storage area for this host's origin
    pub fn session_storage(&self) -> StorageResult<Arc<StorageArea>> {
        self.area(StorageClass::Session)
    }

    /// Subscribe to the notification channel of this host's dispatcher
    pub fn subscribe(&self) -> (Uuid, NotificationReceiver) {
        self.dispatcher.subscribe()
    }

    /// Drop a subscriber
    pub fn unsubscribe(&self, id: Uuid) {
        self.dispatcher.unsubscribe(id)
    }

    /// The dispatcher shared by this host's areas
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
