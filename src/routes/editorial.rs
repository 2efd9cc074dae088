use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Editorial Router Module
///
/// Publication workflow and taxonomy management. Each handler enforces its minimum
/// role (EDITOR, or ADMIN for destructive taxonomy changes) after the session layer.
pub fn editorial_routes() -> Router<AppState> {
    Router::new()
        // PUT /api/v1/posts/{slug}/status
        // Publish, schedule or archive a post. EDITOR and above.
        .route(
            "/api/v1/posts/{slug}/status",
            put(handlers::update_post_status),
        )
        // POST /api/v1/tags
        // EDITOR and above.
        .route("/api/v1/tags", post(handlers::create_tag))
        // DELETE /api/v1/tags/{id}
        // ADMIN only.
        .route("/api/v1/tags/{id}", delete(handlers::delete_tag))
}
