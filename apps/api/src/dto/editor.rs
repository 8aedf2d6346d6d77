use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Freshly opened editor session.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/editor-session-response.ts"
)]
pub struct EditorSessionResponse {
    pub session_id: String,
    pub access: String,
}

/// Role row in the role list.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_privileged: bool,
    pub expanded: bool,
}

/// Result of toggling a role's detail panel.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-selection-response.ts"
)]
pub struct RoleSelectionResponse {
    pub role_id: String,
    pub expanded: bool,
    pub matrix: Option<RoleMatrixResponse>,
}

/// Rendered permission matrix of one role.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-matrix-response.ts"
)]
pub struct RoleMatrixResponse {
    pub role_id: String,
    pub role_name: String,
    pub is_privileged: bool,
    pub mode: String,
    pub dirty_count: usize,
    pub visible_count: usize,
    pub all_checked: bool,
    pub all_partially_checked: bool,
    pub groups: Vec<PermissionGroupResponse>,
}

/// Bulk-toggle group with its checkbox state.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-group-response.ts"
)]
pub struct PermissionGroupResponse {
    pub group_key: String,
    pub label: String,
    pub fully_checked: bool,
    pub partially_checked: bool,
    pub permissions: Vec<PermissionEntryResponse>,
}

/// One visible permission checkbox.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-entry-response.ts"
)]
pub struct PermissionEntryResponse {
    pub permission_id: String,
    pub code: String,
    pub label: String,
    pub effective: bool,
    pub baseline: bool,
}

/// Incoming payload for a single permission toggle.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/toggle-permission-request.ts"
)]
pub struct TogglePermissionRequest {
    pub allowed: bool,
}

/// Incoming payload for a group toggle. `*` targets every visible permission.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/toggle-group-request.ts"
)]
pub struct ToggleGroupRequest {
    pub group_key: String,
    pub allowed: bool,
}

/// Result of a group toggle.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/toggle-group-response.ts"
)]
pub struct ToggleGroupResponse {
    pub touched: usize,
    pub matrix: RoleMatrixResponse,
}

/// Queued toast notification.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/editor-notification-response.ts"
)]
pub struct EditorNotificationResponse {
    pub level: String,
    pub kind: String,
    pub role_id: Option<String>,
    pub message: String,
    pub created_at: String,
}
