use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Authorization core: session resolution plus role and ownership gates.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod validation;

// Routing segregated by minimum privilege.
pub mod routes;
use routes::{authenticated, editorial, public};

// --- Public Re-exports ---

pub use auth::{AuthGate, JwtSessionProvider, Role, SessionContext, SessionResolver};
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every documented handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_posts, handlers::get_post, handlers::list_tags, handlers::get_me,
        handlers::create_post, handlers::update_post, handlers::delete_post,
        handlers::update_post_status, handlers::create_tag, handlers::delete_tag
    ),
    components(
        schemas(
            models::Post, models::PostStatus, models::Author, models::Tag, models::TagSummary,
            models::TagWithCount, models::CreatePostRequest, models::UpdatePostRequest,
            models::UpdatePostStatusRequest, models::CreateTagRequest, models::Pagination,
            models::PostFilters, models::PostListResponse, auth::Principal, auth::Role,
            error::ErrorBody, validation::FieldViolation,
        )
    ),
    tags(
        (name = "astroblog", description = "AstroBlog content API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for the application's services and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Content and user directory.
    pub repo: RepositoryState,
    /// Role and ownership gates over the configured session provider.
    pub gate: AuthGate,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the JWT session provider to `repo` and builds the gates.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Self {
        let provider = Arc::new(JwtSessionProvider::new(&config, repo.clone()));
        AppState {
            gate: AuthGate::new(SessionResolver::new(provider)),
            repo,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(app_state: &AppState) -> AuthGate {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Rejects requests without a valid session (401) before they reach the handlers of
/// the authenticated and editorial routers.
async fn session_middleware(
    State(gate): State<AuthGate>,
    session: SessionContext,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.require_role(&session, Role::User).await?;
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        .merge(
            editorial::editorial_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every HTTP request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
