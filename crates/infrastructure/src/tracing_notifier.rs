//! Notifier that writes editor notifications to tracing output.

use ems_application::{EditorNotification, EditorNotifier, NotificationLevel};
use ems_domain::RoleId;
use tracing::{error, info, warn};

/// Development notifier that logs every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EditorNotifier for TracingNotifier {
    fn notify(&self, notification: EditorNotification) {
        let kind = notification.kind.as_str();
        let role_id = notification.role_id.as_ref().map(RoleId::as_str);
        let message = notification.message.as_str();

        match notification.level {
            NotificationLevel::Success => info!(kind, role_id, "{message}"),
            NotificationLevel::Warning => warn!(kind, role_id, "{message}"),
            NotificationLevel::Error => error!(kind, role_id, "{message}"),
        }
    }
}
