use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ems_core::{AppError, AppResult};
use ems_domain::{GroupingPolicy, PermissionUpdate, Role, RoleId, RoleMatrix};
use tracing::warn;

use crate::{EditorAccess, EditorNotification, EditorNotifier, NotificationKind, PermissionStore};

mod editing;
mod fetch;
mod roles;
mod saving;
mod view;

#[cfg(test)]
mod tests;

pub use saving::{SaveOutcome, SaveSubmission};
pub use view::{GroupView, PermissionView, RoleMatrixView};

/// Tunables for editor behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    /// Upper bound on one save round trip before falling back to editing.
    pub save_timeout: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            save_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for one issued permission fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    role_id: RoleId,
    generation: u64,
}

impl FetchTicket {
    /// Returns the role being fetched.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the per-role issue order of this fetch.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Complete snapshot handed to the store by a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Role being saved.
    pub role_id: RoleId,
    /// One entry per known permission.
    pub updates: Vec<PermissionUpdate>,
}

#[derive(Debug, Default)]
struct RoleEntry {
    matrix: Option<RoleMatrix>,
    expanded: bool,
    issued_generation: u64,
    applied_generation: u64,
}

/// Stateful permission matrix editor owned by one administrator session.
///
/// All mutation goes through `&mut self`, so operations on one editor never
/// overlap. Store calls are the only suspension points.
pub struct PermissionMatrixEditor {
    store: Arc<dyn PermissionStore>,
    notifier: Arc<dyn EditorNotifier>,
    access: EditorAccess,
    policy: GroupingPolicy,
    settings: EditorSettings,
    roles: Vec<Role>,
    entries: HashMap<RoleId, RoleEntry>,
}

impl PermissionMatrixEditor {
    /// Creates an editor for one acting user.
    #[must_use]
    pub fn new(
        store: Arc<dyn PermissionStore>,
        notifier: Arc<dyn EditorNotifier>,
        access: EditorAccess,
        policy: GroupingPolicy,
        settings: EditorSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            access,
            policy,
            settings,
            roles: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Returns the capability the editor was created with.
    #[must_use]
    pub fn access(&self) -> EditorAccess {
        self.access
    }

    /// Returns the grouping policy applied to every role.
    #[must_use]
    pub fn policy(&self) -> &GroupingPolicy {
        &self.policy
    }

    fn find_role(&self, role_id: &RoleId) -> AppResult<&Role> {
        self.roles
            .iter()
            .find(|role| role.role_id() == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' is not loaded")))
    }

    fn matrix_mut(&mut self, role_id: &RoleId) -> AppResult<&mut RoleMatrix> {
        loaded_matrix_mut(&mut self.entries, role_id)
    }

    fn require_view(&self, role_id: Option<&RoleId>) -> AppResult<()> {
        self.access
            .require_view()
            .inspect_err(|error| self.report(NotificationKind::PermissionDenied, role_id, error))
    }

    fn require_manage(&self, role_id: &RoleId) -> AppResult<()> {
        self.access.require_manage().inspect_err(|error| {
            self.report(NotificationKind::PermissionDenied, Some(role_id), error)
        })
    }

    fn report(&self, kind: NotificationKind, role_id: Option<&RoleId>, error: &AppError) {
        warn!(
            kind = kind.as_str(),
            role_id = role_id.map(RoleId::as_str),
            error = %error,
            "permission editor operation failed"
        );
        self.notifier.notify(EditorNotification::new(
            kind,
            role_id.cloned(),
            user_message(kind, error),
        ));
    }
}

fn loaded_matrix_mut<'a>(
    entries: &'a mut HashMap<RoleId, RoleEntry>,
    role_id: &RoleId,
) -> AppResult<&'a mut RoleMatrix> {
    entries
        .get_mut(role_id)
        .and_then(|entry| entry.matrix.as_mut())
        .ok_or_else(|| {
            AppError::NotFound(format!("permissions for role '{role_id}' are not loaded"))
        })
}

fn user_message(kind: NotificationKind, error: &AppError) -> String {
    let detail = match error {
        AppError::Validation(message)
        | AppError::NotFound(message)
        | AppError::Conflict(message)
        | AppError::Unauthorized(message)
        | AppError::Forbidden(message)
        | AppError::Internal(message) => message.as_str(),
    };

    match kind {
        NotificationKind::FetchFailure => format!("Failed to load permissions: {detail}"),
        NotificationKind::SaveFailure => format!("Failed to save permissions: {detail}"),
        NotificationKind::SaveTimedOut => format!("Saving permissions timed out: {detail}"),
        NotificationKind::PermissionDenied => format!("Access denied: {detail}"),
        NotificationKind::Saved => detail.to_owned(),
    }
}
