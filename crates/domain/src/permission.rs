use std::collections::HashSet;

use ems_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Stable permission identifier assigned by the permission store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(NonEmptyString);

impl PermissionId {
    /// Creates a validated permission identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Dotted permission code in the `<domain>.<submodule>.<action>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(NonEmptyString);

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0.into()
    }
}

impl PermissionCode {
    /// Creates a validated permission code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        if value.as_str().split('.').any(str::is_empty) {
            return Err(AppError::Validation(format!(
                "permission code '{}' contains an empty segment",
                value.as_str()
            )));
        }

        Ok(Self(value))
    }

    /// Returns the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the second dot segment, if the code has one.
    #[must_use]
    pub fn submodule(&self) -> Option<&str> {
        let mut segments = self.as_str().split('.');
        segments.next();
        segments.next()
    }

    /// Returns the trailing action segment.
    #[must_use]
    pub fn action(&self) -> &str {
        self.as_str().rsplit('.').next().unwrap_or_else(|| self.as_str())
    }

    /// Returns a human label derived from the action segment.
    ///
    /// `view_all` becomes `View All`; hyphens are treated like underscores.
    #[must_use]
    pub fn label(&self) -> String {
        self.action()
            .split(['_', '-'])
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

/// One allow/deny flag for a role within one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    permission_id: PermissionId,
    module: NonEmptyString,
    code: PermissionCode,
    allowed: bool,
}

impl Permission {
    /// Creates a validated permission record.
    pub fn new(
        permission_id: PermissionId,
        module: impl Into<String>,
        code: PermissionCode,
        allowed: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            permission_id,
            module: NonEmptyString::new(module)?,
            code,
            allowed,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn permission_id(&self) -> &PermissionId {
        &self.permission_id
    }

    /// Returns the owning module name.
    #[must_use]
    pub fn module(&self) -> &str {
        self.module.as_str()
    }

    /// Returns the dotted permission code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
    }

    /// Returns the persisted allow flag.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the human label derived from the code.
    #[must_use]
    pub fn label(&self) -> String {
        self.code.label()
    }
}

/// Ordered permissions persisted for one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: Vec<Permission>,
}

impl PermissionSet {
    /// Creates a permission set, rejecting duplicate identifiers.
    pub fn new(permissions: Vec<Permission>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(permissions.len());
        for permission in &permissions {
            if !seen.insert(permission.permission_id()) {
                return Err(AppError::Validation(format!(
                    "duplicate permission id '{}' in permission set",
                    permission.permission_id()
                )));
            }
        }

        Ok(Self { permissions })
    }

    /// Returns the permissions in store order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Iterates the permissions in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, Permission> {
        self.permissions.iter()
    }

    /// Finds a permission by identifier.
    #[must_use]
    pub fn get(&self, permission_id: &PermissionId) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.permission_id() == permission_id)
    }

    /// Returns whether the identifier belongs to this set.
    #[must_use]
    pub fn contains(&self, permission_id: &PermissionId) -> bool {
        self.get(permission_id).is_some()
    }

    /// Returns the number of permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns whether the set has no permissions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let permissions = Vec::<Permission>::deserialize(deserializer)?;
        Self::new(permissions).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::slice::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One entry of a complete permission snapshot submitted to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionUpdate {
    /// Permission identifier.
    pub permission_id: PermissionId,
    /// Value to persist.
    pub allowed: bool,
}

#[cfg(test)]
mod tests {
    use ems_core::AppResult;

    use super::{Permission, PermissionCode, PermissionId, PermissionSet};

    fn permission(id: &str, code: &str) -> AppResult<Permission> {
        Permission::new(
            PermissionId::new(id)?,
            "Employees",
            PermissionCode::new(code)?,
            false,
        )
    }

    #[test]
    fn code_exposes_submodule_and_action() {
        let code = PermissionCode::new("it_assets.assets.view");
        assert!(code.as_ref().is_ok_and(|code| code.submodule() == Some("assets")));
        assert!(code.is_ok_and(|code| code.action() == "view"));
    }

    #[test]
    fn label_capitalizes_action_words() {
        let code = PermissionCode::new("employees.profile.view_all-records");
        assert_eq!(
            code.map(|code| code.label()).ok().as_deref(),
            Some("View All Records")
        );
    }

    #[test]
    fn single_segment_code_labels_itself() {
        let code = PermissionCode::new("export");
        assert!(code.as_ref().is_ok_and(|code| code.submodule().is_none()));
        assert_eq!(code.map(|code| code.label()).ok().as_deref(), Some("Export"));
    }

    #[test]
    fn code_with_empty_segment_is_rejected() {
        assert!(PermissionCode::new("employees..view").is_err());
    }

    #[test]
    fn permission_set_rejects_duplicate_ids() {
        let permissions = vec![
            permission("1", "employees.profile.view"),
            permission("1", "employees.profile.edit"),
        ]
        .into_iter()
        .collect::<AppResult<Vec<_>>>();

        let result = permissions.and_then(PermissionSet::new);
        assert!(result.is_err());
    }

    #[test]
    fn permission_set_lookup_by_id() {
        let set = permission("4", "tasks.board.view")
            .and_then(|permission| PermissionSet::new(vec![permission]));
        let lookup_id = PermissionId::new("4");

        assert!(matches!(
            (set, lookup_id),
            (Ok(set), Ok(id)) if set.contains(&id) && set.len() == 1
        ));
    }
}
