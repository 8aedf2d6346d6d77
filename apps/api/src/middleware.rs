use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use ems_core::{ActorIdentity, AppError};

use crate::error::ApiResult;

/// Header carrying the authenticated subject, set by the upstream gateway.
pub const SUBJECT_HEADER: &str = "x-ems-subject";
/// Header carrying the acting user's role name, set by the upstream gateway.
pub const ROLE_HEADER: &str = "x-ems-role";

pub async fn require_actor(mut request: Request, next: Next) -> ApiResult<Response> {
    let actor = actor_from_headers(request.headers())?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn actor_from_headers(headers: &HeaderMap) -> Result<ActorIdentity, AppError> {
    let subject = header_value(headers, SUBJECT_HEADER)?;
    let role_name = header_value(headers, ROLE_HEADER)?;
    Ok(ActorIdentity::new(subject, role_name))
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<String, AppError> {
    let value = headers
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing '{name}' header")))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("'{name}' header is not valid text")))?
        .trim();

    if value.is_empty() {
        return Err(AppError::Unauthorized(format!("'{name}' header is empty")));
    }

    Ok(value.to_owned())
}
