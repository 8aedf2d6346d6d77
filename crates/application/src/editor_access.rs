use ems_core::{ActorIdentity, AppError, AppResult};

/// Capability granted to the editor for the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAccess {
    /// Roles and permissions are hidden.
    Denied,
    /// Permissions may be inspected but not changed.
    ViewOnly,
    /// Permissions may be edited and saved.
    Manage,
}

impl EditorAccess {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denied => "denied",
            Self::ViewOnly => "view_only",
            Self::Manage => "manage",
        }
    }

    /// Ensures the capability allows reading roles and permissions.
    pub fn require_view(&self) -> AppResult<()> {
        match self {
            Self::ViewOnly | Self::Manage => Ok(()),
            Self::Denied => Err(AppError::Forbidden(
                "access to role permissions is denied".to_owned(),
            )),
        }
    }

    /// Ensures the capability allows editing and saving permissions.
    pub fn require_manage(&self) -> AppResult<()> {
        match self {
            Self::Manage => Ok(()),
            Self::ViewOnly | Self::Denied => Err(AppError::Forbidden(
                "managing role permissions is not allowed".to_owned(),
            )),
        }
    }
}

/// Maps acting role names to editor capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorAccessPolicy {
    manager_roles: Vec<String>,
    viewer_roles: Vec<String>,
}

impl EditorAccessPolicy {
    /// Creates a policy from manager and viewer role names.
    #[must_use]
    pub fn new(manager_roles: Vec<String>, viewer_roles: Vec<String>) -> Self {
        Self {
            manager_roles,
            viewer_roles,
        }
    }

    /// Resolves the capability for an actor. Role names compare case-insensitively.
    #[must_use]
    pub fn resolve(&self, actor: &ActorIdentity) -> EditorAccess {
        let role_name = actor.role_name().trim();
        let matches = |names: &[String]| {
            names
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(role_name))
        };

        if role_name.is_empty() {
            EditorAccess::Denied
        } else if matches(&self.manager_roles) {
            EditorAccess::Manage
        } else if matches(&self.viewer_roles) {
            EditorAccess::ViewOnly
        } else {
            EditorAccess::Denied
        }
    }
}
