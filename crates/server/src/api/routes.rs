use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{download, handlers, jobs};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes behind the authenticator
    let protected = Router::new()
        .route("/api/convert", post(jobs::convert))
        .route("/api/status/{task_id}", get(jobs::status))
        .route("/api/download/{filename}", get(download::download))
        .route("/api/config", get(handlers::get_config))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // Public routes
    let public = Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/info", get(handlers::info))
        .route("/metrics", get(handlers::metrics));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
