use ems_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Display name of the privileged role whose grants are never editable.
pub const SUPER_ADMIN_ROLE_NAME: &str = "Super Admin";

/// Stable role identifier assigned by the permission store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(NonEmptyString);

impl RoleId {
    /// Creates a validated role identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Role that bundles permissions assignable to employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    role_id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        role_id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            role_id,
            name: NonEmptyString::new(name)?,
            description: description.filter(|value| !value.trim().is_empty()),
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether this is the privileged sentinel role.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.name.as_str() == SUPER_ADMIN_ROLE_NAME
    }
}
