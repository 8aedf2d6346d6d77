use ems_domain::PermissionSet;
use tracing::debug;

use super::*;

impl PermissionMatrixEditor {
    /// Refetches a role's permissions and merges them into the current state.
    pub async fn refresh_role(&mut self, role_id: &RoleId) -> AppResult<()> {
        let ticket = self.begin_fetch(role_id)?;
        let result = self.store.get_permissions(role_id).await;
        self.apply_fetch(ticket, result).map(|_| ())
    }

    /// Registers a fetch about to be issued for a role.
    pub fn begin_fetch(&mut self, role_id: &RoleId) -> AppResult<FetchTicket> {
        self.require_view(Some(role_id))?;
        self.find_role(role_id)?;

        let entry = self.entries.entry(role_id.clone()).or_default();
        entry.issued_generation = entry.issued_generation.saturating_add(1);

        Ok(FetchTicket {
            role_id: role_id.clone(),
            generation: entry.issued_generation,
        })
    }

    /// Applies a completed fetch and returns whether it changed the baseline.
    ///
    /// Responses older than an already applied one are discarded, so the
    /// most recently issued fetch wins regardless of completion order. A
    /// failed fetch leaves the previous baseline untouched.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: AppResult<PermissionSet>,
    ) -> AppResult<bool> {
        let FetchTicket {
            role_id,
            generation,
        } = ticket;

        let is_stale = self
            .entries
            .get(&role_id)
            .is_none_or(|entry| generation <= entry.applied_generation);
        if is_stale {
            debug!(role_id = %role_id, generation, "discarding stale permission fetch");
            return Ok(false);
        }

        let permissions = match result {
            Ok(permissions) => permissions,
            Err(error) => {
                self.report(NotificationKind::FetchFailure, Some(&role_id), &error);
                return Err(error);
            }
        };

        let Some(entry) = self.entries.get_mut(&role_id) else {
            return Ok(false);
        };
        entry.applied_generation = generation;
        match entry.matrix.as_mut() {
            Some(matrix) => matrix.replace_baseline(permissions),
            None => entry.matrix = Some(RoleMatrix::new(role_id.clone(), permissions)),
        }
        debug!(role_id = %role_id, generation, "applied permission fetch");

        Ok(true)
    }
}
