use tracing::{debug, info};

use super::*;

impl PermissionMatrixEditor {
    /// Fetches the role list. On failure the previous list is kept.
    pub async fn load_roles(&mut self) -> AppResult<&[Role]> {
        self.require_view(None)?;

        let roles = match self.store.list_roles().await {
            Ok(roles) => roles,
            Err(error) => {
                self.report(NotificationKind::FetchFailure, None, &error);
                return Err(error);
            }
        };

        self.entries
            .retain(|role_id, _| roles.iter().any(|role| role.role_id() == role_id));
        self.roles = roles;
        info!(role_count = self.roles.len(), "loaded roles");

        Ok(self.roles.as_slice())
    }

    /// Returns the loaded roles in store order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Toggles a role's detail panel and returns whether it is now expanded.
    ///
    /// Expanding a role whose permissions were never fetched triggers the
    /// first fetch; later expansions reuse the loaded baseline. If that first
    /// fetch fails the panel collapses again, so the next selection retries.
    pub async fn select_role(&mut self, role_id: &RoleId) -> AppResult<bool> {
        self.require_view(Some(role_id))?;
        self.find_role(role_id)?;

        let entry = self.entries.entry(role_id.clone()).or_default();
        entry.expanded = !entry.expanded;
        let expanded = entry.expanded;
        let needs_fetch = expanded && entry.matrix.is_none();
        debug!(role_id = %role_id, expanded, needs_fetch, "role selection toggled");

        if needs_fetch && let Err(error) = self.refresh_role(role_id).await {
            if let Some(entry) = self.entries.get_mut(role_id) {
                entry.expanded = false;
            }
            return Err(error);
        }

        Ok(expanded)
    }

    /// Returns whether the role's detail panel is expanded.
    #[must_use]
    pub fn is_expanded(&self, role_id: &RoleId) -> bool {
        self.entries
            .get(role_id)
            .is_some_and(|entry| entry.expanded)
    }
}
