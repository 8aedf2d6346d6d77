//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_permission_store;
mod in_memory_notification_outbox;
mod in_memory_permission_store;
mod tracing_notifier;

pub use http_permission_store::HttpPermissionStore;
pub use in_memory_notification_outbox::{InMemoryNotificationOutbox, OutboxNotifier};
pub use in_memory_permission_store::InMemoryPermissionStore;
pub use tracing_notifier::TracingNotifier;
