//! Per-role permission edit state.
//!
//! A [`RoleMatrix`] holds the last server-confirmed baseline for one role and,
//! while editing, an overlay of unsaved values keyed by permission id. The
//! overlay is always total over the baseline ids once editing starts; every
//! baseline arrival goes through [`RoleMatrix::reconcile_overlay`] so local
//! edits survive background refreshes.

use std::collections::BTreeMap;

use ems_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{GroupKey, GroupingPolicy, PermissionId, PermissionSet, PermissionUpdate, RoleId};

/// Edit lifecycle of one role's permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Displayed values equal the baseline.
    #[default]
    Viewing,
    /// A local overlay is being edited.
    Editing,
    /// The overlay is in flight to the store.
    Saving,
}

impl EditMode {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Saving => "saving",
        }
    }
}

/// Baseline plus unsaved overlay for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMatrix {
    role_id: RoleId,
    baseline: PermissionSet,
    overlay: Option<BTreeMap<PermissionId, bool>>,
    mode: EditMode,
}

impl RoleMatrix {
    /// Creates a viewing matrix from a fetched baseline.
    #[must_use]
    pub fn new(role_id: RoleId, baseline: PermissionSet) -> Self {
        Self {
            role_id,
            baseline,
            overlay: None,
            mode: EditMode::Viewing,
        }
    }

    /// Returns the role this matrix belongs to.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the last server-confirmed permissions.
    #[must_use]
    pub fn baseline(&self) -> &PermissionSet {
        &self.baseline
    }

    /// Returns the unsaved overlay, if one exists.
    #[must_use]
    pub fn overlay(&self) -> Option<&BTreeMap<PermissionId, bool>> {
        self.overlay.as_ref()
    }

    /// Returns the current edit mode.
    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Returns the value shown for a permission, or `None` when unknown.
    #[must_use]
    pub fn effective(&self, permission_id: &PermissionId) -> Option<bool> {
        let baseline = self.baseline.get(permission_id)?.allowed();
        match (&self.overlay, self.mode) {
            (Some(overlay), EditMode::Editing | EditMode::Saving) => {
                Some(overlay.get(permission_id).copied().unwrap_or(baseline))
            }
            _ => Some(baseline),
        }
    }

    /// Enters editing and makes the overlay total over the baseline.
    pub fn begin_edit(&mut self) -> AppResult<()> {
        if self.mode == EditMode::Saving {
            return Err(self.mode_conflict("begin editing"));
        }

        self.mode = EditMode::Editing;
        self.reconcile_overlay();
        Ok(())
    }

    /// Merges the baseline into the overlay without overwriting local edits.
    ///
    /// Entries for ids no longer in the baseline are dropped and ids missing
    /// from the overlay are seeded with their baseline value.
    pub fn reconcile_overlay(&mut self) {
        if self.mode == EditMode::Viewing {
            self.overlay = None;
            return;
        }

        let previous = self.overlay.take().unwrap_or_default();
        let merged = self
            .baseline
            .iter()
            .map(|permission| {
                let value = previous
                    .get(permission.permission_id())
                    .copied()
                    .unwrap_or_else(|| permission.allowed());
                (permission.permission_id().clone(), value)
            })
            .collect();
        self.overlay = Some(merged);
    }

    /// Replaces the baseline with freshly fetched permissions.
    pub fn replace_baseline(&mut self, baseline: PermissionSet) {
        self.baseline = baseline;
        self.reconcile_overlay();
    }

    /// Discards the overlay and returns to viewing.
    ///
    /// Cancelling while a save is in flight is refused.
    pub fn cancel_edit(&mut self) -> AppResult<()> {
        if self.mode == EditMode::Saving {
            return Err(self.mode_conflict("cancel"));
        }

        self.overlay = None;
        self.mode = EditMode::Viewing;
        Ok(())
    }

    /// Sets one overlay value.
    pub fn toggle_permission(
        &mut self,
        permission_id: &PermissionId,
        value: bool,
    ) -> AppResult<()> {
        if !self.baseline.contains(permission_id) {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' is not known for role '{}'",
                self.role_id
            )));
        }

        let overlay = self.editing_overlay("toggle a permission")?;
        overlay.insert(permission_id.clone(), value);
        Ok(())
    }

    /// Sets every member of a group and returns how many entries were touched.
    pub fn toggle_group(
        &mut self,
        policy: &GroupingPolicy,
        group: &GroupKey,
        value: bool,
    ) -> AppResult<usize> {
        policy.validate_key(group)?;
        let members = policy
            .members(&self.baseline, group)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        let overlay = self.editing_overlay("toggle a group")?;
        for permission_id in &members {
            overlay.insert(permission_id.clone(), value);
        }

        Ok(members.len())
    }

    /// Returns whether the group is non-empty and every member is allowed.
    #[must_use]
    pub fn is_group_fully_checked(&self, policy: &GroupingPolicy, group: &GroupKey) -> bool {
        let (checked, total) = self.group_counts(policy, group);
        total > 0 && checked == total
    }

    /// Returns whether some but not all group members are allowed.
    #[must_use]
    pub fn is_group_partially_checked(&self, policy: &GroupingPolicy, group: &GroupKey) -> bool {
        let (checked, total) = self.group_counts(policy, group);
        checked > 0 && checked < total
    }

    /// Enters saving and returns the complete snapshot to submit.
    pub fn begin_save(&mut self) -> AppResult<Vec<PermissionUpdate>> {
        if self.mode != EditMode::Editing {
            return Err(self.mode_conflict("save"));
        }

        self.mode = EditMode::Saving;
        Ok(self
            .baseline
            .iter()
            .map(|permission| PermissionUpdate {
                permission_id: permission.permission_id().clone(),
                allowed: self
                    .overlay
                    .as_ref()
                    .and_then(|overlay| overlay.get(permission.permission_id()))
                    .copied()
                    .unwrap_or_else(|| permission.allowed()),
            })
            .collect())
    }

    /// Applies an acknowledged save: the server set becomes the baseline.
    pub fn complete_save(&mut self, confirmed: PermissionSet) -> AppResult<()> {
        if self.mode != EditMode::Saving {
            return Err(self.mode_conflict("complete a save"));
        }

        self.baseline = confirmed;
        self.overlay = None;
        self.mode = EditMode::Viewing;
        Ok(())
    }

    /// Returns to editing after a rejected save, keeping the overlay.
    pub fn fail_save(&mut self) -> AppResult<()> {
        if self.mode != EditMode::Saving {
            return Err(self.mode_conflict("fail a save"));
        }

        self.mode = EditMode::Editing;
        self.reconcile_overlay();
        Ok(())
    }

    /// Counts overlay entries that differ from the baseline.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        let Some(overlay) = &self.overlay else {
            return 0;
        };

        self.baseline
            .iter()
            .filter(|permission| {
                overlay
                    .get(permission.permission_id())
                    .is_some_and(|value| *value != permission.allowed())
            })
            .count()
    }

    /// Returns whether any unsaved change exists.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty_count() > 0
    }

    fn group_counts(&self, policy: &GroupingPolicy, group: &GroupKey) -> (usize, usize) {
        let members = policy.members(&self.baseline, group);
        let checked = members
            .iter()
            .filter(|permission_id| self.effective(permission_id).unwrap_or(false))
            .count();
        (checked, members.len())
    }

    fn editing_overlay(&mut self, action: &str) -> AppResult<&mut BTreeMap<PermissionId, bool>> {
        if self.mode != EditMode::Editing {
            return Err(self.mode_conflict(action));
        }

        Ok(self.overlay.get_or_insert_with(BTreeMap::new))
    }

    fn mode_conflict(&self, action: &str) -> AppError {
        AppError::Conflict(format!(
            "cannot {action} for role '{}' while {}",
            self.role_id,
            self.mode.as_str()
        ))
    }
}
