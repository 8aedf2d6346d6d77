//! Application services and ports.

#![forbid(unsafe_code)]

mod editor_access;
mod permission_matrix_service;
mod permission_ports;

pub use editor_access::{EditorAccess, EditorAccessPolicy};
pub use permission_matrix_service::{
    EditorSettings, FetchTicket, GroupView, PermissionMatrixEditor, PermissionView,
    RoleMatrixView, SaveOutcome, SaveRequest, SaveSubmission,
};
pub use permission_ports::{
    EditorNotification, EditorNotifier, NotificationKind, NotificationLevel, PermissionStore,
};
