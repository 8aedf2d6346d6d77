use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ems_core::AppResult;
use ems_domain::{PermissionSet, PermissionUpdate, Role, RoleId};

/// Remote source of truth for roles and their permission grants.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Lists every role visible to the administrator.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Fetches the permission set persisted for a role.
    async fn get_permissions(&self, role_id: &RoleId) -> AppResult<PermissionSet>;

    /// Persists a complete permission snapshot and returns the new
    /// authoritative set.
    async fn update_permissions(
        &self,
        role_id: &RoleId,
        updates: Vec<PermissionUpdate>,
    ) -> AppResult<PermissionSet>;
}

/// Severity shown by the toast layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Operation completed.
    Success,
    /// Request refused before reaching the store.
    Warning,
    /// Store or transport failure.
    Error,
}

impl NotificationLevel {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Editor event category surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Roles or permissions could not be retrieved.
    FetchFailure,
    /// A save was rejected or failed in transport.
    SaveFailure,
    /// A save did not resolve within the configured timeout.
    SaveTimedOut,
    /// The acting user may not perform the operation.
    PermissionDenied,
    /// A save was acknowledged by the store.
    Saved,
}

impl NotificationKind {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailure => "fetch_failure",
            Self::SaveFailure => "save_failure",
            Self::SaveTimedOut => "save_timed_out",
            Self::PermissionDenied => "permission_denied",
            Self::Saved => "saved",
        }
    }

    /// Returns the toast severity for this kind.
    #[must_use]
    pub fn level(&self) -> NotificationLevel {
        match self {
            Self::FetchFailure | Self::SaveFailure | Self::SaveTimedOut => NotificationLevel::Error,
            Self::PermissionDenied => NotificationLevel::Warning,
            Self::Saved => NotificationLevel::Success,
        }
    }
}

/// User-visible notification emitted by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorNotification {
    /// Toast severity.
    pub level: NotificationLevel,
    /// Event category.
    pub kind: NotificationKind,
    /// Role the event relates to, if any.
    pub role_id: Option<RoleId>,
    /// Human-readable message.
    pub message: String,
    /// Emission time.
    pub created_at: DateTime<Utc>,
}

impl EditorNotification {
    /// Creates a notification stamped with the current time.
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        role_id: Option<RoleId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: kind.level(),
            kind,
            role_id,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Port for the toast/notification mechanism.
pub trait EditorNotifier: Send + Sync {
    /// Publishes one notification.
    fn notify(&self, notification: EditorNotification);
}
