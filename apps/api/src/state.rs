use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use ems_application::{
    EditorAccess, EditorAccessPolicy, EditorSettings, PermissionMatrixEditor, PermissionStore,
};
use ems_core::{ActorIdentity, AppError, AppResult};
use ems_domain::GroupingPolicy;
use ems_infrastructure::InMemoryNotificationOutbox;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

/// One administrator's editor together with the actor that opened it.
pub struct EditorSession {
    pub owner: ActorIdentity,
    pub editor: Mutex<PermissionMatrixEditor>,
    last_seen: StdMutex<Instant>,
}

impl EditorSession {
    fn new(owner: ActorIdentity, editor: PermissionMatrixEditor) -> Self {
        Self {
            owner,
            editor: Mutex::new(editor),
            last_seen: StdMutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        let last_seen = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_seen) >= idle_timeout
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_store: Arc<dyn PermissionStore>,
    pub outbox: Arc<InMemoryNotificationOutbox>,
    pub access_policy: EditorAccessPolicy,
    pub grouping_policy: GroupingPolicy,
    pub editor_settings: EditorSettings,
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<EditorSession>>>>,
    pub session_idle_timeout: Duration,
    pub frontend_url: String,
}

impl AppState {
    /// Opens a new editor session for an actor allowed to at least view.
    pub async fn open_session(&self, actor: ActorIdentity) -> AppResult<(Uuid, EditorAccess)> {
        let access = self.access_policy.resolve(&actor);
        access.require_view()?;
        self.evict_idle_sessions().await;

        let session_id = Uuid::new_v4();
        let editor = PermissionMatrixEditor::new(
            Arc::clone(&self.permission_store),
            Arc::new(self.outbox.notifier_for(session_id.to_string())),
            access,
            self.grouping_policy.clone(),
            self.editor_settings,
        );

        info!(
            session_id = %session_id,
            subject = actor.subject(),
            access = access.as_str(),
            "opened permission editor session"
        );
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(EditorSession::new(actor, editor)));

        Ok((session_id, access))
    }

    /// Looks up a session owned by `actor` and marks it as active.
    ///
    /// Sessions idle for longer than the configured timeout are gone.
    pub async fn session(
        &self,
        session_id: Uuid,
        actor: &ActorIdentity,
    ) -> AppResult<Arc<EditorSession>> {
        let missing = || AppError::NotFound(format!("editor session '{session_id}' does not exist"));
        let session = self
            .sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(missing)?;

        if session.is_idle(Instant::now(), self.session_idle_timeout) {
            self.remove_session(session_id).await;
            debug!(session_id = %session_id, "expired idle permission editor session");
            return Err(missing());
        }

        if session.owner.subject() != actor.subject() {
            return Err(AppError::Forbidden(format!(
                "editor session '{session_id}' belongs to another user"
            )));
        }

        session.touch();
        Ok(session)
    }

    /// Closes a session and discards its pending notifications.
    pub async fn close_session(&self, session_id: Uuid, actor: &ActorIdentity) -> AppResult<()> {
        self.session(session_id, actor).await?;
        self.remove_session(session_id).await;
        info!(session_id = %session_id, "closed permission editor session");
        Ok(())
    }

    /// Drops every session idle past the timeout and returns how many went.
    pub async fn evict_idle_sessions(&self) -> usize {
        let now = Instant::now();
        let idle = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, session)| session.is_idle(now, self.session_idle_timeout))
            .map(|(session_id, _)| *session_id)
            .collect::<Vec<_>>();

        for session_id in &idle {
            self.remove_session(*session_id).await;
        }
        if !idle.is_empty() {
            info!(evicted = idle.len(), "evicted idle permission editor sessions");
        }

        idle.len()
    }

    /// Periodically evicts idle sessions for the lifetime of the process.
    pub fn spawn_idle_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(state.session_idle_timeout);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                state.evict_idle_sessions().await;
            }
        })
    }

    async fn remove_session(&self, session_id: Uuid) {
        self.sessions.write().await.remove(&session_id);
        self.outbox.remove_session(&session_id.to_string());
    }
}
