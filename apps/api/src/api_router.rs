use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use wardgate_core::AppError;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

mod cors;

pub fn build_router(
    app_state: AppState,
    session_layer: SessionManagerLayer<PostgresStore>,
    frontend_url: &str,
) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let protected_routes = Router::new()
        .route("/api/dashboard", get(handlers::dashboard_handler))
        .route("/api/capabilities", get(handlers::capabilities_handler))
        .route("/api/records/{resource}", get(handlers::list_records_handler))
        .route(
            "/api/records/{resource}/{row_id}",
            get(handlers::get_record_handler)
                .put(handlers::update_record_handler)
                .delete(handlers::delete_record_handler),
        )
        .route_layer(from_fn(middleware::require_identity));

    Ok(Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/logout", post(handlers::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
