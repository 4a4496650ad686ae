//! API Routes
//!
//! Configures the Axum router with all memoization endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, export_handler, get_handler, health_handler, import_handler, metadata_handler,
    set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get", post(get_handler))
        .route("/set", put(set_handler))
        .route("/metadata", post(metadata_handler))
        .route("/stats", get(stats_handler))
        .route("/clear", delete(clear_handler))
        .route("/export", get(export_handler))
        .route("/import", post(import_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
