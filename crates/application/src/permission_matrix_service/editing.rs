use ems_domain::{EditMode, GroupKey, PermissionId};
use tracing::{debug, info};

use super::*;

impl PermissionMatrixEditor {
    /// Enters edit mode for a role.
    ///
    /// The privileged role is refused locally, before any store call.
    pub fn begin_edit(&mut self, role_id: &RoleId) -> AppResult<()> {
        self.require_manage(role_id)?;

        if self.find_role(role_id)?.is_privileged() {
            let error = AppError::Forbidden(format!(
                "permissions of role '{role_id}' cannot be edited"
            ));
            self.report(NotificationKind::PermissionDenied, Some(role_id), &error);
            return Err(error);
        }

        self.matrix_mut(role_id)?.begin_edit()?;
        info!(role_id = %role_id, "permission editing started");
        Ok(())
    }

    /// Discards unsaved edits and reverts to the baseline.
    pub fn cancel_edit(&mut self, role_id: &RoleId) -> AppResult<()> {
        self.matrix_mut(role_id)?.cancel_edit()?;
        info!(role_id = %role_id, "permission editing cancelled");
        Ok(())
    }

    /// Sets one permission in the overlay.
    pub fn toggle_permission(
        &mut self,
        role_id: &RoleId,
        permission_id: &PermissionId,
        value: bool,
    ) -> AppResult<()> {
        self.require_manage(role_id)?;
        self.matrix_mut(role_id)?
            .toggle_permission(permission_id, value)?;
        debug!(role_id = %role_id, permission_id = %permission_id, value, "permission toggled");
        Ok(())
    }

    /// Sets every member of a group in the overlay.
    ///
    /// [`GroupKey::AllVisible`] toggles every visible permission through the
    /// same path as a single group.
    pub fn toggle_group(
        &mut self,
        role_id: &RoleId,
        group: &GroupKey,
        value: bool,
    ) -> AppResult<usize> {
        self.require_manage(role_id)?;
        let touched = loaded_matrix_mut(&mut self.entries, role_id)?
            .toggle_group(&self.policy, group, value)?;
        debug!(role_id = %role_id, group = %group, value, touched, "group toggled");
        Ok(touched)
    }

    /// Returns the loaded matrix for a role.
    #[must_use]
    pub fn matrix(&self, role_id: &RoleId) -> Option<&RoleMatrix> {
        self.entries
            .get(role_id)
            .and_then(|entry| entry.matrix.as_ref())
    }

    /// Returns the edit mode of a loaded role.
    #[must_use]
    pub fn mode(&self, role_id: &RoleId) -> Option<EditMode> {
        self.matrix(role_id).map(RoleMatrix::mode)
    }

    /// Returns the value currently shown for one permission.
    #[must_use]
    pub fn effective_value(&self, role_id: &RoleId, permission_id: &PermissionId) -> Option<bool> {
        self.matrix(role_id)
            .and_then(|matrix| matrix.effective(permission_id))
    }

    /// Returns whether every member of a non-empty group is allowed.
    #[must_use]
    pub fn is_group_fully_checked(&self, role_id: &RoleId, group: &GroupKey) -> bool {
        self.matrix(role_id)
            .is_some_and(|matrix| matrix.is_group_fully_checked(&self.policy, group))
    }

    /// Returns whether a group is indeterminate.
    #[must_use]
    pub fn is_group_partially_checked(&self, role_id: &RoleId, group: &GroupKey) -> bool {
        self.matrix(role_id)
            .is_some_and(|matrix| matrix.is_group_partially_checked(&self.policy, group))
    }
}
