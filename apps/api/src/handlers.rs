use ems_core::AppResult;
use ems_domain::{PermissionId, RoleId};

pub mod health;
pub mod matrix;
pub mod roles;
pub mod sessions;

fn parse_role_id(raw: String) -> AppResult<RoleId> {
    RoleId::new(raw)
}

fn parse_permission_id(raw: String) -> AppResult<PermissionId> {
    PermissionId::new(raw)
}
