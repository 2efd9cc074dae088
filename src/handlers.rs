use crate::{
    AppState,
    auth::{Principal, Role, SessionContext, authorize_role},
    error::{ApiError, ErrorBody},
    extract::{ApiJson, ApiQuery},
    models::{
        ApiResponse, Author, CreatePostRequest, CreateTagRequest, Pagination, Post, PostFilters,
        PostListResponse, PostStatus, Tag, TagWithCount, UpdatePostRequest,
        UpdatePostStatusRequest,
    },
    repository::PostQuery,
    validation::Validate,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

// --- Filter Structs ---

/// PostFilter
///
/// Query parameters accepted by GET /api/v1/posts.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PostFilter {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size, clamped to 1..=100 (default 10).
    pub limit: Option<u32>,
    /// Case-insensitive match against title, excerpt and content.
    pub search: Option<String>,
    /// Tag slug.
    pub tag: Option<String>,
    /// Only featured posts when true.
    pub featured: Option<bool>,
}

impl PostFilter {
    pub fn into_query(self) -> PostQuery {
        PostQuery {
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            search: self.search.filter(|s| !s.trim().is_empty()),
            tag: self.tag.filter(|t| !t.is_empty()),
            featured: self.featured.unwrap_or(false),
        }
    }
}

// --- Public Handlers ---

/// list_posts
///
/// [Public Route] Lists published posts with search, tag and featured filters.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostFilter),
    responses((status = 200, description = "Published posts, newest first", body = PostListResponse))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PostFilter>,
) -> Json<ApiResponse<PostListResponse>> {
    let query = filter.into_query();
    let page = state.repo.list_posts(&query).await;

    let message = format!("Retrieved {} posts", page.posts.len());
    let response = PostListResponse {
        pagination: Pagination::new(query.page, query.limit, page.total_count),
        posts: page.posts,
        filters: PostFilters {
            search: query.search,
            tag: query.tag,
            featured: query.featured,
        },
    };
    Json(ApiResponse::ok(response, message))
}

/// get_post
///
/// [Public Route] A single published post. Drafts and archived posts are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let post = state
        .repo
        .get_published_post(&slug)
        .await
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(ApiResponse::ok(post, "Post retrieved")))
}

/// list_tags
///
/// [Public Route] All tags with their published post counts.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    responses((status = 200, description = "Tags", body = [TagWithCount]))
)]
pub async fn list_tags(State(state): State<AppState>) -> Json<ApiResponse<Vec<TagWithCount>>> {
    let tags = state.repo.list_tags().await;
    let message = format!("Retrieved {} tags", tags.len());
    Json(ApiResponse::ok(tags, message))
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The principal resolved for the current session.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current principal", body = Principal),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let principal = state.gate.require_role(&session, Role::User).await?;
    Ok(Json(ApiResponse::ok(principal, "Authenticated")))
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the caller. New posts are drafts unless
/// the caller is an EDITOR or above and asks for another status.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Status change requires EDITOR", body = ErrorBody),
        (status = 409, description = "Slug taken", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    session: SessionContext,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Post>>), ApiError> {
    let principal = state.gate.require_role(&session, Role::User).await?;

    let requested = payload.status.unwrap_or_default();
    let principal = if requested == PostStatus::Draft {
        principal
    } else {
        authorize_role(Some(principal), Role::Editor)?
    };

    let payload = payload.validate()?;

    let author = state
        .repo
        .get_user(&principal.id)
        .await
        .map(Author::from)
        .unwrap_or_else(|| Author::from(&principal));

    let post = state.repo.create_post(payload, author).await?;
    tracing::info!(post_id = %post.id, author_id = %post.author_id, "post created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post, "Post created"))))
}

/// update_post
///
/// [Authenticated Route] Partial update of a post.
///
/// *Authorization*: Owner or ADMIN (ownership gate).
#[utoipa::path(
    put,
    path = "/api/v1/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
    ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let post = state
        .repo
        .get_post_by_slug(&slug)
        .await
        .ok_or(ApiError::NotFound("Post"))?;

    state
        .gate
        .require_ownership(&session, &post.author_id)
        .await?;

    let payload = payload.validate()?;
    let updated = state.repo.update_post(post.id, payload).await?;
    Ok(Json(ApiResponse::ok(updated, "Post updated")))
}

/// delete_post
///
/// [Authenticated Route] Deletes a post.
///
/// *Authorization*: Owner or ADMIN (ownership gate).
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let post = state
        .repo
        .get_post_by_slug(&slug)
        .await
        .ok_or(ApiError::NotFound("Post"))?;

    let principal = state
        .gate
        .require_ownership(&session, &post.author_id)
        .await?;

    if !state.repo.delete_post(post.id).await {
        return Err(ApiError::NotFound("Post"));
    }
    tracing::info!(post_id = %post.id, deleted_by = %principal.id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- Editorial Handlers ---

/// update_post_status
///
/// [Editorial Route] Moves a post through the publication workflow.
///
/// *RBAC*: EDITOR or above.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{slug}/status",
    params(("slug" = String, Path, description = "Post slug")),
    request_body = UpdatePostStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Requires EDITOR", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_post_status(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
    ApiJson(payload): ApiJson<UpdatePostStatusRequest>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    state.gate.require_role(&session, Role::Editor).await?;

    let post = state
        .repo
        .get_post_by_slug(&slug)
        .await
        .ok_or(ApiError::NotFound("Post"))?;

    let updated = state
        .repo
        .set_post_status(post.id, payload.status)
        .await
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(ApiResponse::ok(updated, "Post status updated")))
}

/// create_tag
///
/// [Editorial Route] Adds a tag to the taxonomy.
///
/// *RBAC*: EDITOR or above.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Created", body = Tag),
        (status = 403, description = "Requires EDITOR", body = ErrorBody),
        (status = 409, description = "Slug taken", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    session: SessionContext,
    ApiJson(payload): ApiJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Tag>>), ApiError> {
    state.gate.require_role(&session, Role::Editor).await?;

    let payload = payload.validate()?;
    let tag = state.repo.create_tag(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tag, "Tag created"))))
}

/// delete_tag
///
/// [Admin Route] Removes a tag and detaches it from every post.
///
/// *RBAC*: ADMIN only.
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Requires ADMIN", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.gate.require_role(&session, Role::Admin).await?;

    if state.repo.delete_tag(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Tag"))
    }
}
