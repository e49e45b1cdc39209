//! # Mutation Broadcast
//!
//! Cross-area change notification:
//!
//! - **Events**: ephemeral mutation records and the notifications
//!   delivered to subscribers
//! - **Registry**: process-wide append-only list of live storage areas,
//!   the candidate set for sibling matching
//! - **Dispatcher**: fans a mutation out to every sibling area of the same
//!   (class, origin), excluding the mutating area itself
//!
//! Broadcast is a best-effort side effect of mutation: delivery is scheduled
//! synchronously onto an unbounded channel, subscribers drain it
//! asynchronously, and no failure on this path ever reaches the mutating
//! caller.

mod dispatcher;
mod errors;
mod event;
mod registry;

pub use dispatcher::{DispatchResult, Dispatcher, NotificationReceiver, NotificationSender};
pub use errors::{BroadcastError, BroadcastResult};
pub use event::{MutationRecord, StorageNotification};
pub use registry::AreaRegistry;
