//! # Notification Dispatcher
//!
//! Fan-out of mutation records to subscribers, one notification per sibling
//! area. Delivery is scheduled synchronously (the mutating call returns
//! after every notification has been queued) but subscribers consume
//! asynchronously from their channel.
//!
//! Best-effort contract: dispatch never fails the mutation path. Registry
//! lookup failures are logged and swallowed.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::observability::Logger;

use super::event::{MutationRecord, StorageNotification};
use super::registry::AreaRegistry;

/// Sender half of a subscriber channel
pub type NotificationSender = mpsc::UnboundedSender<StorageNotification>;

/// Receiver half of a subscriber channel
pub type NotificationReceiver = mpsc::UnboundedReceiver<StorageNotification>;

/// One subscriber on the process-wide notification channel
#[derive(Debug)]
struct Subscriber {
    id: Uuid,
    sender: NotificationSender,
}

/// Dispatches mutation records to sibling areas' subscribers.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<AreaRegistry>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl Dispatcher {
    /// Create a dispatcher over an area registry
    pub fn new(registry: Arc<AreaRegistry>) -> Self {
        Self {
            registry,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// The registry this dispatcher matches siblings against
    pub fn registry(&self) -> &Arc<AreaRegistry> {
        &self.registry
    }

    /// Subscribe to the process-wide notification channel.
    ///
    /// Every subscriber receives every delivered notification; the affected
    /// area rides along on each one for filtering. The returned id can be
    /// passed to [`Dispatcher::unsubscribe`].
    pub fn subscribe(&self) -> (Uuid, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push(Subscriber { id, sender: tx });
        }

        (id, rx)
    }

    /// Drop a subscriber
    pub fn unsubscribe(&self, id: Uuid) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.retain(|s| s.id != id);
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Fan a mutation record out to siblings of the mutating area.
    ///
    /// Contract: siblings are all registered areas with the source's
    /// (class, origin), EXCLUDING the source area itself; an area never
    /// receives a notification for its own mutation. Siblings are notified
    /// in registration order. The sibling set is snapshotted before any
    /// delivery, so an area registered mid-broadcast is not notified for an
    /// event that predates it.
    pub fn dispatch(&self, record: MutationRecord) -> DispatchResult {
        let mut result = DispatchResult::default();

        let siblings = match self.registry.find_siblings(
            record.class,
            &record.origin,
            Some(record.source_id),
        ) {
            Ok(siblings) => siblings,
            Err(e) => {
                Logger::warn("BROADCAST_SKIPPED", &[("reason", &e.to_string())]);
                return result;
            }
        };
        result.matched = siblings.len();

        let subscribers = match self.subscribers.read() {
            Ok(subscribers) => subscribers,
            Err(_) => {
                Logger::warn("BROADCAST_SKIPPED", &[("reason", "subscriber lock poisoned")]);
                return result;
            }
        };

        for area in siblings {
            let notification = StorageNotification::from_record(&record, area);
            for subscriber in subscribers.iter() {
                match subscriber.sender.send(notification.clone()) {
                    Ok(_) => result.delivered += 1,
                    Err(_) => result.failed += 1,
                }
            }
        }

        result
    }
}

/// Result of dispatching one mutation record
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Number of sibling areas matched
    pub matched: usize,
    /// Number of notifications queued to subscribers
    pub delivered: usize,
    /// Number of sends that failed (closed receivers)
    pub failed: usize,
}
