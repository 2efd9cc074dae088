use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::Role,
    models::{
        Author, CreatePostRequest, CreateTagRequest, Post, PostStatus, Tag, TagSummary,
        TagWithCount, UpdatePostRequest, User,
    },
    validation::DEFAULT_TAG_COLOR,
};

/// Failures of write operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Post not found")]
    PostNotFound,
    #[error("Slug '{0}' is already in use")]
    SlugTaken(String),
    #[error("Unknown tag id {0}")]
    UnknownTag(Uuid),
}

/// PostQuery
///
/// Normalised listing parameters. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub featured: bool,
}

impl Default for PostQuery {
    fn default() -> Self {
        PostQuery {
            page: 1,
            limit: 10,
            search: None,
            tag: None,
            featured: false,
        }
    }
}

/// One page of published posts plus the size of the whole filtered set.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_count: u64,
}

/// Repository Trait
///
/// The contract the handlers use for content and the user directory. Authorization is
/// not enforced here; handlers run the gates before calling write methods.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    // Published posts matching the query, newest first.
    async fn list_posts(&self, query: &PostQuery) -> PostPage;
    // Any post regardless of status.
    async fn get_post_by_slug(&self, slug: &str) -> Option<Post>;
    async fn get_published_post(&self, slug: &str) -> Option<Post>;
    async fn create_post(
        &self,
        req: CreatePostRequest,
        author: Author,
    ) -> Result<Post, RepositoryError>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest)
    -> Result<Post, RepositoryError>;
    // Publishing stamps `published_at` the first time.
    async fn set_post_status(&self, id: Uuid, status: PostStatus) -> Option<Post>;
    async fn delete_post(&self, id: Uuid) -> bool;

    // --- Tags ---
    async fn list_tags(&self) -> Vec<TagWithCount>;
    async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, RepositoryError>;
    // Also detaches the tag from every post.
    async fn delete_tag(&self, id: Uuid) -> bool;

    // --- User Directory ---
    async fn get_user(&self, id: &str) -> Option<User>;
}

pub type RepositoryState = Arc<dyn Repository>;

#[derive(Default)]
struct Store {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    users: HashMap<String, User>,
}

impl Store {
    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.posts
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }

    fn resolve_tags(&self, ids: &[Uuid]) -> Result<Vec<TagSummary>, RepositoryError> {
        ids.iter()
            .map(|id| {
                self.tags
                    .iter()
                    .find(|t| t.id == *id)
                    .map(TagSummary::from)
                    .ok_or(RepositoryError::UnknownTag(*id))
            })
            .collect()
    }
}

/// InMemoryRepository
///
/// Process-local implementation of [`Repository`] guarded by a single async RwLock.
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }

    /// A repository with the sample directory, tags and posts.
    pub fn seeded() -> Self {
        Self {
            store: RwLock::new(seed_store()),
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.store.write().await.users.insert(user.id.clone(), user);
    }
}

fn matches_search(post: &Post, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    post.title.to_lowercase().contains(&needle)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(&needle))
        || post.content.to_lowercase().contains(&needle)
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_posts(&self, query: &PostQuery) -> PostPage {
        let store = self.store.read().await;

        let mut matching: Vec<&Post> = store
            .posts
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .filter(|p| !query.featured || p.featured)
            .filter(|p| {
                query
                    .tag
                    .as_deref()
                    .is_none_or(|slug| p.tags.iter().any(|t| t.slug == slug))
            })
            .filter(|p| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|needle| matches_search(p, needle))
            })
            .collect();

        matching.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let total_count = matching.len() as u64;
        let offset = (query.page.max(1) as usize - 1) * query.limit as usize;
        let posts = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        PostPage { posts, total_count }
    }

    async fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        let store = self.store.read().await;
        store.posts.iter().find(|p| p.slug == slug).cloned()
    }

    async fn get_published_post(&self, slug: &str) -> Option<Post> {
        self.get_post_by_slug(slug)
            .await
            .filter(|p| p.status == PostStatus::Published)
    }

    async fn create_post(
        &self,
        req: CreatePostRequest,
        author: Author,
    ) -> Result<Post, RepositoryError> {
        let mut store = self.store.write().await;

        if store.slug_taken(&req.slug, None) {
            return Err(RepositoryError::SlugTaken(req.slug));
        }
        let tags = store.resolve_tags(&req.tag_ids)?;

        let now = Utc::now();
        let status = req.status.unwrap_or_default();
        let post = Post {
            id: Uuid::new_v4(),
            title: req.title,
            slug: req.slug,
            excerpt: req.excerpt,
            content: req.content,
            status,
            featured: req.featured,
            author_id: author.id.clone(),
            author,
            tags,
            meta_title: req.meta_title,
            meta_description: req.meta_description,
            keywords: req.keywords,
            views: 0,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };

        store.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post, RepositoryError> {
        let mut store = self.store.write().await;

        if let Some(slug) = &req.slug {
            if store.slug_taken(slug, Some(id)) {
                return Err(RepositoryError::SlugTaken(slug.clone()));
            }
        }
        let tags = match &req.tag_ids {
            Some(ids) => Some(store.resolve_tags(ids)?),
            None => None,
        };

        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::PostNotFound)?;

        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(slug) = req.slug {
            post.slug = slug;
        }
        if let Some(excerpt) = req.excerpt {
            post.excerpt = Some(excerpt);
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(featured) = req.featured {
            post.featured = featured;
        }
        if let Some(meta_title) = req.meta_title {
            post.meta_title = Some(meta_title);
        }
        if let Some(meta_description) = req.meta_description {
            post.meta_description = Some(meta_description);
        }
        if let Some(keywords) = req.keywords {
            post.keywords = keywords;
        }
        if let Some(tags) = tags {
            post.tags = tags;
        }
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn set_post_status(&self, id: Uuid, status: PostStatus) -> Option<Post> {
        let mut store = self.store.write().await;
        let post = store.posts.iter_mut().find(|p| p.id == id)?;

        let now = Utc::now();
        post.status = status;
        if status == PostStatus::Published && post.published_at.is_none() {
            post.published_at = Some(now);
        }
        post.updated_at = now;
        Some(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> bool {
        let mut store = self.store.write().await;
        let before = store.posts.len();
        store.posts.retain(|p| p.id != id);
        store.posts.len() != before
    }

    async fn list_tags(&self) -> Vec<TagWithCount> {
        let store = self.store.read().await;
        store
            .tags
            .iter()
            .map(|tag| {
                let post_count = store
                    .posts
                    .iter()
                    .filter(|p| p.status == PostStatus::Published)
                    .filter(|p| p.tags.iter().any(|t| t.id == tag.id))
                    .count() as i64;
                TagWithCount {
                    id: tag.id,
                    name: tag.name.clone(),
                    slug: tag.slug.clone(),
                    description: tag.description.clone(),
                    color: tag.color.clone(),
                    post_count,
                }
            })
            .collect()
    }

    async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, RepositoryError> {
        let mut store = self.store.write().await;
        if store.tags.iter().any(|t| t.slug == req.slug) {
            return Err(RepositoryError::SlugTaken(req.slug));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            name: req.name,
            slug: req.slug,
            description: req.description,
            color: req.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
        };
        store.tags.push(tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, id: Uuid) -> bool {
        let mut store = self.store.write().await;
        let before = store.tags.len();
        store.tags.retain(|t| t.id != id);
        if store.tags.len() == before {
            return false;
        }
        for post in store.posts.iter_mut() {
            post.tags.retain(|t| t.id != id);
        }
        true
    }

    async fn get_user(&self, id: &str) -> Option<User> {
        self.store.read().await.users.get(id).cloned()
    }
}

// --- Sample Data ---

fn seed_user(id: &str, name: &str, username: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@astroblog.dev", username),
        username: Some(username.to_string()),
        role,
        image: None,
        bio: None,
    }
}

fn seed_tag(n: u128, name: &str, slug: &str, description: &str, color: &str) -> Tag {
    Tag {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        color: color.to_string(),
    }
}

fn seed_store() -> Store {
    let mut author = seed_user("author-1", "AstroBlog Team", "astroblog", Role::Editor);
    author.bio = Some("Writing about the modern web, performance and security".to_string());

    let users = [
        author.clone(),
        seed_user("admin-1", "Site Admin", "admin", Role::Admin),
        seed_user("moderator-1", "Community Moderator", "moderator", Role::Moderator),
        seed_user("user-123", "Regular Reader", "reader", Role::User),
    ]
    .into_iter()
    .map(|u| (u.id.clone(), u))
    .collect();

    let tags = vec![
        seed_tag(1, "Rust", "rust", "Systems programming with Rust", "#000000"),
        seed_tag(2, "SEO", "seo", "Search engine optimization techniques", "#3B82F6"),
        seed_tag(3, "Performance", "performance", "Web performance and Core Web Vitals", "#10B981"),
        seed_tag(4, "Security", "security", "Web security best practices", "#EF4444"),
        seed_tag(5, "Best Practices", "best-practices", "Development standards", "#8B5CF6"),
    ];

    // (title, slug, excerpt, featured, days since publication, views, tag indexes)
    let samples: [(&str, &str, &str, bool, i64, i64, &[usize]); 3] = [
        (
            "Welcome to AstroBlog",
            "welcome-to-astroblog",
            "A modern blog platform with a security-first architecture.",
            true,
            0,
            0,
            &[0, 1],
        ),
        (
            "Performance Optimization Guide",
            "performance-optimization-guide",
            "Optimize for Core Web Vitals, image delivery and caching.",
            false,
            1,
            150,
            &[0, 2],
        ),
        (
            "Security Best Practices for Web Applications",
            "security-best-practices-web-applications",
            "Essential practices from input validation to authentication.",
            true,
            2,
            320,
            &[3, 4],
        ),
    ];

    let now = Utc::now();
    let posts = samples
        .into_iter()
        .zip(101u128..)
        .map(|((title, slug, excerpt, featured, days, views, tag_idx), n)| {
            let published = now - Duration::days(days);
            Post {
                id: Uuid::from_u128(n),
                title: title.to_string(),
                slug: slug.to_string(),
                excerpt: Some(excerpt.to_string()),
                content: format!("<p>{}</p>", excerpt),
                status: PostStatus::Published,
                featured,
                author_id: author.id.clone(),
                author: Author::from(author.clone()),
                tags: tag_idx.iter().map(|&i| TagSummary::from(&tags[i])).collect(),
                meta_title: None,
                meta_description: None,
                keywords: Vec::new(),
                views,
                published_at: Some(published),
                created_at: published,
                updated_at: published,
            }
        })
        .collect();

    Store { posts, tags, users }
}
