//! API Routes
//!
//! Configures the Axum router with all feed service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_delete_handler, cache_stats_handler,
    create_notification_handler, delete_notification_handler, feed_handler, fixtures_handler,
    health_handler, live_matches_handler, mark_all_read_handler, mark_read_handler,
    match_handler, refresh_feed_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (the UI is served from elsewhere)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(cache_clear_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/:key", delete(cache_delete_handler))
        .route("/matches/live", get(live_matches_handler))
        .route("/matches/:id", get(match_handler))
        .route("/seasons/:id/fixtures", get(fixtures_handler))
        .route(
            "/notifications/:owner",
            get(feed_handler).post(create_notification_handler),
        )
        .route("/notifications/:owner/refresh", post(refresh_feed_handler))
        .route("/notifications/:owner/read-all", post(mark_all_read_handler))
        .route("/notifications/:owner/:id/read", post(mark_read_handler))
        .route("/notifications/:owner/:id", delete(delete_notification_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
