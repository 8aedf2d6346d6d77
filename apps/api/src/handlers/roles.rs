use axum::Json;
use axum::extract::{Extension, Path, State};
use ems_core::ActorIdentity;
use uuid::Uuid;

use crate::dto::{RoleMatrixResponse, RoleResponse, RoleSelectionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_role_id;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;
    editor.load_roles().await?;

    let roles = editor
        .roles()
        .iter()
        .map(|role| RoleResponse::from_role(role, editor.is_expanded(role.role_id())))
        .collect();

    Ok(Json(roles))
}

pub async fn select_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleSelectionResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    let expanded = editor.select_role(&role_id).await?;
    let matrix = if expanded {
        Some(RoleMatrixResponse::from(editor.matrix_view(&role_id)?))
    } else {
        None
    };

    Ok(Json(RoleSelectionResponse {
        role_id: role_id.to_string(),
        expanded,
        matrix,
    }))
}

pub async fn refresh_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((session_id, role_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RoleMatrixResponse>> {
    let role_id = parse_role_id(role_id)?;
    let session = state.session(session_id, &actor).await?;
    let mut editor = session.editor.lock().await;

    editor.refresh_role(&role_id).await?;

    Ok(Json(RoleMatrixResponse::from(editor.matrix_view(&role_id)?)))
}
