use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes open to any signed-in principal (USER and above). The router is wrapped in
/// the session middleware; per-resource rules (ownership) run inside the handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/v1/me
        .route("/api/v1/me", get(handlers::get_me))
        // POST /api/v1/posts
        // The caller becomes the post's owner.
        .route("/api/v1/posts", post(handlers::create_post))
        // PUT/DELETE /api/v1/posts/{slug}
        // Owner or ADMIN only.
        .route(
            "/api/v1/posts/{slug}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
}
