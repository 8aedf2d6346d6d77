use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ems_application::PermissionStore;
use ems_core::{AppError, AppResult};
use ems_domain::{Permission, PermissionSet, PermissionUpdate, Role, RoleId};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory permission store used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    roles: RwLock<Vec<Role>>,
    permissions: RwLock<HashMap<RoleId, PermissionSet>>,
    unavailable: AtomicBool,
}

impl InMemoryPermissionStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a role together with its permission set.
    pub async fn seed_role(&self, role: Role, permissions: PermissionSet) {
        let role_id = role.role_id().clone();
        {
            let mut roles = self.roles.write().await;
            match roles.iter_mut().find(|stored| stored.role_id() == &role_id) {
                Some(stored) => *stored = role,
                None => roles.push(role),
            }
        }

        self.permissions.write().await.insert(role_id, permissions);
    }

    /// Makes every subsequent call fail with an internal error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "permission store is unavailable".to_owned(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.ensure_available()?;
        Ok(self.roles.read().await.clone())
    }

    async fn get_permissions(&self, role_id: &RoleId) -> AppResult<PermissionSet> {
        self.ensure_available()?;
        self.permissions
            .read()
            .await
            .get(role_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn update_permissions(
        &self,
        role_id: &RoleId,
        updates: Vec<PermissionUpdate>,
    ) -> AppResult<PermissionSet> {
        self.ensure_available()?;
        let mut permissions = self.permissions.write().await;
        let current = permissions
            .get(role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        if let Some(unknown) = updates
            .iter()
            .find(|update| !current.contains(&update.permission_id))
        {
            return Err(AppError::Validation(format!(
                "permission '{}' does not belong to role '{role_id}'",
                unknown.permission_id
            )));
        }

        let updated = current
            .iter()
            .map(|permission| {
                let allowed = updates
                    .iter()
                    .rev()
                    .find(|update| &update.permission_id == permission.permission_id())
                    .map_or(permission.allowed(), |update| update.allowed);
                Permission::new(
                    permission.permission_id().clone(),
                    permission.module(),
                    permission.code().clone(),
                    allowed,
                )
            })
            .collect::<AppResult<Vec<_>>>()?;
        let updated = PermissionSet::new(updated)?;
        permissions.insert(role_id.clone(), updated.clone());
        debug!(role_id = %role_id, entries = updates.len(), "stored permission snapshot");

        Ok(updated)
    }
}
