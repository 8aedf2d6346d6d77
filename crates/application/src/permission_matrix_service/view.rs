use ems_domain::{EditMode, GroupKey, PermissionId};

use super::*;

/// One visible permission as rendered in the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionView {
    /// Permission identifier.
    pub permission_id: PermissionId,
    /// Dotted permission code.
    pub code: String,
    /// Label derived from the code.
    pub label: String,
    /// Value currently shown.
    pub effective: bool,
    /// Last server-confirmed value.
    pub baseline: bool,
}

/// One bulk-toggle group with its check state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    /// Group key accepted by bulk toggles.
    pub key: GroupKey,
    /// Heading shown for the group.
    pub label: String,
    /// Every member is allowed.
    pub fully_checked: bool,
    /// Some but not all members are allowed.
    pub partially_checked: bool,
    /// Members in store order.
    pub permissions: Vec<PermissionView>,
}

/// Derived, read-only projection of one role's matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMatrixView {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role display name.
    pub role_name: String,
    /// Whether editing is refused for this role.
    pub is_privileged: bool,
    /// Current edit mode.
    pub mode: EditMode,
    /// Unsaved entries differing from the baseline.
    pub dirty_count: usize,
    /// Number of permissions shown.
    pub visible_count: usize,
    /// "Check all" state.
    pub all_checked: bool,
    /// "Check all" indeterminate state.
    pub all_partially_checked: bool,
    /// Visible groups in first-seen order.
    pub groups: Vec<GroupView>,
}

impl PermissionMatrixEditor {
    /// Builds the render projection for a loaded role.
    ///
    /// Check states are recomputed from the matrix on every call.
    pub fn matrix_view(&self, role_id: &RoleId) -> AppResult<RoleMatrixView> {
        self.require_view(Some(role_id))?;
        let role = self.find_role(role_id)?;
        let matrix = self.matrix(role_id).ok_or_else(|| {
            AppError::NotFound(format!("permissions for role '{role_id}' are not loaded"))
        })?;
        let baseline = matrix.baseline();

        let groups = self
            .policy
            .groups(baseline)
            .into_iter()
            .map(|key| {
                let permissions = self
                    .policy
                    .members(baseline, &key)
                    .into_iter()
                    .filter_map(|permission_id| baseline.get(permission_id))
                    .map(|permission| PermissionView {
                        permission_id: permission.permission_id().clone(),
                        code: permission.code().as_str().to_owned(),
                        label: permission.label(),
                        effective: matrix
                            .effective(permission.permission_id())
                            .unwrap_or_else(|| permission.allowed()),
                        baseline: permission.allowed(),
                    })
                    .collect();

                GroupView {
                    label: group_label(&key),
                    fully_checked: matrix.is_group_fully_checked(&self.policy, &key),
                    partially_checked: matrix.is_group_partially_checked(&self.policy, &key),
                    key,
                    permissions,
                }
            })
            .collect();

        Ok(RoleMatrixView {
            role_id: role_id.clone(),
            role_name: role.name().to_owned(),
            is_privileged: role.is_privileged(),
            mode: matrix.mode(),
            dirty_count: matrix.dirty_count(),
            visible_count: self.policy.visible_count(baseline),
            all_checked: matrix.is_group_fully_checked(&self.policy, &GroupKey::AllVisible),
            all_partially_checked: matrix
                .is_group_partially_checked(&self.policy, &GroupKey::AllVisible),
            groups,
        })
    }
}

fn group_label(key: &GroupKey) -> String {
    match key {
        GroupKey::Module(module) => module.clone(),
        GroupKey::Submenu { submenu, .. } => submenu.clone(),
        GroupKey::AllVisible => "All permissions".to_owned(),
    }
}
