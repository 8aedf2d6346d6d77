use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use ems_core::ActorIdentity;
use ems_domain::GroupKey;
use uuid::Uuid;

use crate::dto::{
    RoleMatrixResponse, ToggleGroupRequest, ToggleGroupResponse, TogglePermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_permission_id, parse_role_id};

pub async fn role_matrix_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;
    let editor = session.editor.lock().await;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}

pub async fn begin_edit_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    editor.begin_edit(&role_id)?;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}

pub async fn cancel_edit_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    editor.cancel_edit(&role_id)?;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}

pub async fn toggle_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id, permission_id)): Path<(Uuid, String, String)>,
    Json(payload): Json<TogglePermissionRequest>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let permission_id = parse_permission_id(permission_id)?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    editor.toggle_permission(&role_id, &permission_id, payload.allowed)?;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}

pub async fn toggle_group_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
    Json(payload): Json<ToggleGroupRequest>,
) -> ApiResult<Json<ToggleGroupResponse>> {
    let role_id = parse_role_id(role_id)?;
    let group = GroupKey::from_str(payload.group_key.as_str())?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    let touched = editor.toggle_group(&role_id, &group, payload.allowed)?;

    Ok(Json(ToggleGroupResponse {
        touched,
        matrix: RoleMatrixResponse::from(editor.matrix_view(&role_id)?),
    }))
}

pub async fn save_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;

    // The store round trip runs unlocked so reads observe the saving mode.
    let submission = session.editor.lock().await.save_submission(&role_id)?;
    let outcome = submission.submit().await;

    let mut editor = session.editor.lock().await;
    editor.finish_save(outcome)?;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}
