use ems_application::{EditorNotification, GroupView, PermissionView, RoleMatrixView};
use ems_domain::{Role, RoleId};

use super::{
    EditorNotificationResponse, PermissionEntryResponse, PermissionGroupResponse,
    RoleMatrixResponse, RoleResponse,
};

impl RoleResponse {
    pub fn from_role(role: &Role, expanded: bool) -> Self {
        Self {
            role_id: role.role_id().as_str().to_owned(),
            name: role.name().to_owned(),
            description: role.description().map(ToOwned::to_owned),
            is_privileged: role.is_privileged(),
            expanded,
        }
    }
}

impl From<PermissionView> for PermissionEntryResponse {
    fn from(value: PermissionView) -> Self {
        Self {
            permission_id: value.permission_id.as_str().to_owned(),
            code: value.code,
            label: value.label,
            effective: value.effective,
            baseline: value.baseline,
        }
    }
}

impl From<GroupView> for PermissionGroupResponse {
    fn from(value: GroupView) -> Self {
        Self {
            group_key: value.key.to_string(),
            label: value.label,
            fully_checked: value.fully_checked,
            partially_checked: value.partially_checked,
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionEntryResponse::from)
                .collect(),
        }
    }
}

impl From<RoleMatrixView> for RoleMatrixResponse {
    fn from(value: RoleMatrixView) -> Self {
        Self {
            role_id: value.role_id.as_str().to_owned(),
            role_name: value.role_name,
            is_privileged: value.is_privileged,
            mode: value.mode.as_str().to_owned(),
            dirty_count: value.dirty_count,
            visible_count: value.visible_count,
            all_checked: value.all_checked,
            all_partially_checked: value.all_partially_checked,
            groups: value
                .groups
                .into_iter()
                .map(PermissionGroupResponse::from)
                .collect(),
        }
    }
}

impl From<EditorNotification> for EditorNotificationResponse {
    fn from(value: EditorNotification) -> Self {
        Self {
            level: value.level.as_str().to_owned(),
            kind: value.kind.as_str().to_owned(),
            role_id: value.role_id.as_ref().map(RoleId::to_string),
            message: value.message,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}
