use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. Reads are restricted to published content
/// at the repository level, so drafts never leak to anonymous readers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/v1/posts?page=..&limit=..&search=..&tag=..&featured=..
        .route("/api/v1/posts", get(handlers::list_posts))
        // GET /api/v1/posts/{slug}
        .route("/api/v1/posts/{slug}", get(handlers::get_post))
        // GET /api/v1/tags
        .route("/api/v1/tags", get(handlers::list_tags))
}
