use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{Principal, Role};

// --- Core Application Schemas ---

/// User
///
/// A member of the user directory. Sessions reference users by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub role: Role,
    pub image: Option<String>,
    pub bio: Option<String>,
}

/// PostStatus
///
/// Publication workflow state. Only `PUBLISHED` posts are visible to anonymous readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
    Archived,
}

/// Author
///
/// Public byline embedded in every post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for Author {
    fn from(user: User) -> Self {
        Author {
            id: user.id,
            name: user.name,
            username: user.username,
            image: user.image,
            bio: user.bio,
        }
    }
}

impl From<&Principal> for Author {
    /// Byline for a principal that has no directory entry.
    fn from(principal: &Principal) -> Self {
        Author {
            id: principal.id.clone(),
            name: principal
                .username
                .clone()
                .unwrap_or_else(|| principal.id.clone()),
            username: principal.username.clone(),
            image: None,
            bio: None,
        }
    }
}

/// Tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    // Hex colour, e.g. "#3B82F6".
    pub color: String,
}

/// TagSummary
///
/// The subset of a tag embedded in post payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl From<&Tag> for TagSummary {
    fn from(tag: &Tag) -> Self {
        TagSummary {
            id: tag.id,
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            color: tag.color.clone(),
        }
    }
}

/// TagWithCount
///
/// Tag listing entry carrying the number of published posts using the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TagWithCount {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub post_count: i64,
}

/// Post
///
/// A blog post. `author_id` is the owner consulted by the ownership gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: PostStatus,
    pub featured: bool,
    pub author_id: String,
    pub author: Author,
    pub tags: Vec<TagSummary>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub views: i64,

    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for POST /api/v1/posts. A status other than `DRAFT` requires the
/// EDITOR role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// UpdatePostRequest
///
/// Partial update payload for PUT /api/v1/posts/{slug}. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<Uuid>>,
}

/// UpdatePostStatusRequest
///
/// Input payload for PUT /api/v1/posts/{slug}/status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdatePostStatusRequest {
    pub status: PostStatus,
}

/// CreateTagRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTagRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    // Defaults to "#3B82F6".
    #[serde(default)]
    pub color: Option<String>,
}

// --- Listing Schemas (Output) ---

/// Pagination
///
/// Paging metadata for list responses. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        let limit_u64 = u64::from(limit.max(1));
        let end = u64::from(page.max(1)) * limit_u64;
        Pagination {
            page,
            limit,
            total_count,
            total_pages: total_count.div_ceil(limit_u64),
            has_next_page: end < total_count,
            has_previous_page: page > 1,
        }
    }
}

/// PostFilters
///
/// Echo of the filters applied to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostFilters {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub featured: bool,
}

/// PostListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
    pub filters: PostFilters,
}

/// ApiResponse
///
/// Success envelope shared by every JSON endpoint. Failures use
/// [`crate::error::ErrorBody`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data,
            message: message.into(),
        }
    }
}
