mod common;
mod editor;

pub use common::HealthResponse;
pub use editor::{
    EditorNotificationResponse, EditorSessionResponse, PermissionEntryResponse,
    PermissionGroupResponse, RoleMatrixResponse, RoleResponse, RoleSelectionResponse,
    ToggleGroupRequest, ToggleGroupResponse, TogglePermissionRequest,
};
