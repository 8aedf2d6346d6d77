use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use ems_application::{EditorNotification, EditorNotifier};

use crate::TracingNotifier;

const DEFAULT_SESSION_CAPACITY: usize = 64;

/// Per-session notification buffer drained by the rendering layer.
///
/// Each session keeps at most `capacity` notifications; the oldest entry is
/// dropped when a new one arrives on a full buffer.
#[derive(Debug)]
pub struct InMemoryNotificationOutbox {
    capacity: usize,
    sessions: Mutex<HashMap<String, VecDeque<EditorNotification>>>,
}

impl Default for InMemoryNotificationOutbox {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemoryNotificationOutbox {
    /// Creates an outbox with the default per-session capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an outbox keeping at most `capacity` entries per session.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a notifier that files notifications under one session.
    #[must_use]
    pub fn notifier_for(self: &Arc<Self>, session_key: impl Into<String>) -> OutboxNotifier {
        OutboxNotifier {
            outbox: Arc::clone(self),
            session_key: session_key.into(),
            log: TracingNotifier::new(),
        }
    }

    /// Appends a notification to a session buffer.
    pub fn push(&self, session_key: &str, notification: EditorNotification) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = sessions.entry(session_key.to_owned()).or_default();
        if queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(notification);
    }

    /// Removes and returns every buffered notification of a session, oldest first.
    pub fn drain(&self, session_key: &str) -> Vec<EditorNotification> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(session_key)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Forgets a session and its pending notifications.
    pub fn remove_session(&self, session_key: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_key);
    }
}

/// Session-scoped handle implementing [`EditorNotifier`].
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    outbox: Arc<InMemoryNotificationOutbox>,
    session_key: String,
    log: TracingNotifier,
}

impl EditorNotifier for OutboxNotifier {
    fn notify(&self, notification: EditorNotification) {
        self.log.notify(notification.clone());
        self.outbox.push(&self.session_key, notification);
    }
}
