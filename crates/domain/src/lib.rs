//! Domain entities and invariants for role permission administration.

#![forbid(unsafe_code)]

mod grouping;
mod matrix;
mod permission;
mod role;

pub use grouping::{
    COMPOSITE_MODULE, DEFAULT_EXCLUDED_MODULES, GroupKey, GroupingPolicy, SUBMENU_LABELS,
};
pub use matrix::{EditMode, RoleMatrix};
pub use permission::{Permission, PermissionCode, PermissionId, PermissionSet, PermissionUpdate};
pub use role::{Role, RoleId, SUPER_ADMIN_ROLE_NAME};
