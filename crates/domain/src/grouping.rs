//! Bulk-toggle grouping derived from permission modules and codes.
//!
//! Every permission maps to at most one [`GroupKey`]. Permissions without a
//! key are hidden from the editable surface and never take part in bulk
//! operations, so visibility and grouping are answered by the same function.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ems_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionId, PermissionSet};

/// Modules removed from the editable surface.
///
/// Kept as the built-in default; [`GroupingPolicy::with_excluded_modules`]
/// lets deployments supply their own list.
pub const DEFAULT_EXCLUDED_MODULES: &[&str] = &["My Devices", "Prompts", "Roles", "Settings"];

/// Module whose permissions are grouped per submenu instead of per module.
pub const COMPOSITE_MODULE: &str = "IT Asset Management";

/// Submenu code segment to display label for the composite module.
pub const SUBMENU_LABELS: &[(&str, &str)] = &[
    ("assets", "Assets"),
    ("assignments", "Assignments"),
    ("tickets", "Tickets"),
    ("maintenance", "Maintenance"),
    ("inventory", "Inventory"),
];

const SUBMENU_SEPARATOR: &str = "::";
const ALL_VISIBLE_TOKEN: &str = "*";

/// Group targeted by bulk toggles and check-state queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupKey {
    /// Every permission of a plain module.
    Module(String),
    /// One submenu of the composite module.
    Submenu {
        /// Owning module name.
        module: String,
        /// Submenu display label.
        submenu: String,
    },
    /// Union of every visible permission ("check all").
    AllVisible,
}

impl GroupKey {
    /// Returns whether a permission keyed by `key` belongs to this group.
    #[must_use]
    pub fn covers(&self, key: &GroupKey) -> bool {
        match self {
            Self::AllVisible => true,
            other => other == key,
        }
    }
}

impl Display for GroupKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Module(module) => formatter.write_str(module),
            Self::Submenu { module, submenu } => {
                write!(formatter, "{module}{SUBMENU_SEPARATOR}{submenu}")
            }
            Self::AllVisible => formatter.write_str(ALL_VISIBLE_TOKEN),
        }
    }
}

impl FromStr for GroupKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Validation("group key must not be empty".to_owned()));
        }

        if value == ALL_VISIBLE_TOKEN {
            return Ok(Self::AllVisible);
        }

        match value.split_once(SUBMENU_SEPARATOR) {
            Some((module, submenu)) if !module.is_empty() && !submenu.is_empty() => {
                Ok(Self::Submenu {
                    module: module.to_owned(),
                    submenu: submenu.to_owned(),
                })
            }
            Some(_) => Err(AppError::Validation(format!(
                "group key '{value}' must be 'module' or 'module::submenu'"
            ))),
            None => Ok(Self::Module(value.to_owned())),
        }
    }
}

impl TryFrom<String> for GroupKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<GroupKey> for String {
    fn from(value: GroupKey) -> Self {
        value.to_string()
    }
}

/// Tables deciding which permissions are visible and how they group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingPolicy {
    excluded_modules: Vec<String>,
    composite_module: String,
    submenu_labels: Vec<(String, String)>,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self {
            excluded_modules: DEFAULT_EXCLUDED_MODULES
                .iter()
                .map(|module| (*module).to_owned())
                .collect(),
            composite_module: COMPOSITE_MODULE.to_owned(),
            submenu_labels: SUBMENU_LABELS
                .iter()
                .map(|(code, label)| ((*code).to_owned(), (*label).to_owned()))
                .collect(),
        }
    }
}

impl GroupingPolicy {
    /// Replaces the excluded module list.
    #[must_use]
    pub fn with_excluded_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the excluded module names.
    #[must_use]
    pub fn excluded_modules(&self) -> &[String] {
        &self.excluded_modules
    }

    /// Rejects keys that can never resolve to a group under this policy.
    ///
    /// Submenu keys must name the composite module and one of its display
    /// labels; the composite module itself is never a plain module group.
    pub fn validate_key(&self, key: &GroupKey) -> AppResult<()> {
        match key {
            GroupKey::AllVisible => Ok(()),
            GroupKey::Module(module) if *module == self.composite_module => Err(
                AppError::Validation(format!("module '{module}' is grouped per submenu")),
            ),
            GroupKey::Module(_) => Ok(()),
            GroupKey::Submenu { module, submenu } => {
                let known = *module == self.composite_module
                    && self.submenu_labels.iter().any(|(_, label)| label == submenu);
                if known {
                    Ok(())
                } else {
                    Err(AppError::Validation(format!("unknown submenu group '{key}'")))
                }
            }
        }
    }

    /// Resolves the group a permission belongs to.
    ///
    /// Returns `None` for excluded modules and for composite-module
    /// permissions whose submenu segment is missing or unmapped.
    #[must_use]
    pub fn group_key_for(&self, permission: &Permission) -> Option<GroupKey> {
        let module = permission.module();
        if self.excluded_modules.iter().any(|excluded| excluded == module) {
            return None;
        }

        if module != self.composite_module {
            return Some(GroupKey::Module(module.to_owned()));
        }

        let submenu = permission.code().submodule()?;
        self.submenu_labels
            .iter()
            .find(|(code, _)| code == submenu)
            .map(|(_, label)| GroupKey::Submenu {
                module: module.to_owned(),
                submenu: label.clone(),
            })
    }

    /// Returns whether the permission is shown on the editable surface.
    #[must_use]
    pub fn is_visible(&self, permission: &Permission) -> bool {
        self.group_key_for(permission).is_some()
    }

    /// Iterates visible permissions in set order.
    pub fn visible<'a>(
        &'a self,
        permissions: &'a PermissionSet,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        permissions
            .iter()
            .filter(move |permission| self.is_visible(permission))
    }

    /// Counts visible permissions.
    #[must_use]
    pub fn visible_count(&self, permissions: &PermissionSet) -> usize {
        self.visible(permissions).count()
    }

    /// Lists distinct group keys in first-seen order.
    #[must_use]
    pub fn groups(&self, permissions: &PermissionSet) -> Vec<GroupKey> {
        let mut keys: Vec<GroupKey> = Vec::new();
        for key in permissions
            .iter()
            .filter_map(|permission| self.group_key_for(permission))
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        keys
    }

    /// Resolves a group key to its member permission ids in set order.
    #[must_use]
    pub fn members<'a>(
        &self,
        permissions: &'a PermissionSet,
        group: &GroupKey,
    ) -> Vec<&'a PermissionId> {
        permissions
            .iter()
            .filter(|permission| {
                self.group_key_for(permission)
                    .is_some_and(|key| group.covers(&key))
            })
            .map(Permission::permission_id)
            .collect()
    }
}
