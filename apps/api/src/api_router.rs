use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use ems_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(app_state.frontend_url.as_str())?;

    let session_routes = Router::new()
        .route(
            "/api/editor-sessions",
            post(handlers::sessions::create_session_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}",
            delete(handlers::sessions::close_session_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/notifications",
            get(handlers::sessions::drain_notifications_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles",
            get(handlers::roles::list_roles_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/select",
            post(handlers::roles::select_role_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/refresh",
            post(handlers::roles::refresh_role_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/matrix",
            get(handlers::matrix::role_matrix_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/edit",
            post(handlers::matrix::begin_edit_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/cancel",
            post(handlers::matrix::cancel_edit_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/permissions/{permission_id}",
            put(handlers::matrix::toggle_permission_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/groups",
            put(handlers::matrix::toggle_group_handler),
        )
        .route(
            "/api/editor-sessions/{session_id}/roles/{role_id}/save",
            post(handlers::matrix::save_permissions_handler),
        )
        .layer(from_fn(middleware::require_actor));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(session_routes)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
