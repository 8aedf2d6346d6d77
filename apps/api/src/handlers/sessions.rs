use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use ems_core::ActorIdentity;
use uuid::Uuid;

use crate::dto::{EditorNotificationResponse, EditorSessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
) -> ApiResult<(StatusCode, Json<EditorSessionResponse>)> {
    let (session_id, access) = state.open_session(actor).await?;

    Ok((
        StatusCode::CREATED,
        Json(EditorSessionResponse {
            session_id: session_id.to_string(),
            access: access.as_str().to_owned(),
        }),
    ))
}

pub async fn close_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.close_session(session_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn drain_notifications_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<EditorNotificationResponse>>> {
    state.session(session_id, &actor).await?;

    let notifications = state
        .outbox
        .drain(&session_id.to_string())
        .into_iter()
        .map(EditorNotificationResponse::from)
        .collect();

    Ok(Json(notifications))
}
