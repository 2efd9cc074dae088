//! Input validation for request payloads.
//!
//! Rules are small functions returning `Result<(), String>`; a [`Validator`] runs them
//! against named fields and collects every violation instead of stopping at the first.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CreatePostRequest, CreateTagRequest, UpdatePostRequest};

pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
static TAG_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s-]+$").unwrap());
static COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());
static DANGEROUS_HTML: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script\b.*?</script>",
        r"(?is)<iframe\b.*?</iframe>",
        r"(?i)javascript:",
        r"(?i)\bon\w+\s*=",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// A single rule violation on a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    /// A single violation on `field`.
    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Collects violations across fields.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, outcome: Result<(), String>) -> &mut Self {
        if let Err(message) = outcome {
            self.errors.violations.push(FieldViolation {
                field: field.to_string(),
                message,
            });
        }
        self
    }

    /// Runs `rule` only when the optional field is present.
    pub fn check_opt<V: ?Sized>(
        &mut self,
        field: &str,
        value: Option<&V>,
        rule: impl FnOnce(&V) -> Result<(), String>,
    ) -> &mut Self {
        match value {
            Some(value) => self.check(field, rule(value)),
            None => self,
        }
    }

    /// Returns `value` when no rule failed.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.violations.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Implemented by payloads that can be checked before they reach the repository.
pub trait Validate: Sized {
    fn validate(self) -> Result<Self, ValidationErrors>;
}

// --- Rules ---

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn max_len(max: usize) -> impl Fn(&str) -> Result<(), String> {
    move |value| {
        if char_len(value) > max {
            Err(format!("Must be at most {} characters", max))
        } else {
            Ok(())
        }
    }
}

pub fn title(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("Title cannot be empty or contain only whitespace".to_string());
    }
    if char_len(value) > 200 {
        return Err("Title must be less than 200 characters".to_string());
    }
    Ok(())
}

pub fn slug(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("Slug is required".to_string());
    }
    if char_len(value) > 200 {
        return Err("Slug must be less than 200 characters".to_string());
    }
    if !SLUG_REGEX.is_match(value) {
        return Err(
            "Slug must contain only lowercase letters, numbers, and single hyphens".to_string(),
        );
    }
    Ok(())
}

pub fn excerpt(value: &str) -> Result<(), String> {
    if char_len(value) > 500 {
        return Err("Excerpt must be less than 500 characters".to_string());
    }
    Ok(())
}

pub fn content(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("Content is required".to_string());
    }
    if char_len(value) > 50_000 {
        return Err("Content must be less than 50,000 characters".to_string());
    }
    if DANGEROUS_HTML.iter().any(|pattern| pattern.is_match(value)) {
        return Err("Content contains potentially dangerous HTML".to_string());
    }
    Ok(())
}

pub fn meta_title(value: &str) -> Result<(), String> {
    if char_len(value) > 60 {
        return Err("Meta title must be less than 60 characters".to_string());
    }
    Ok(())
}

pub fn meta_description(value: &str) -> Result<(), String> {
    let len = char_len(value);
    if !(120..=160).contains(&len) {
        return Err("Meta description must be between 120 and 160 characters".to_string());
    }
    Ok(())
}

pub fn keywords(values: &[String]) -> Result<(), String> {
    if values.len() > 10 {
        return Err("Maximum 10 keywords allowed".to_string());
    }
    if values.iter().any(|k| k.is_empty() || char_len(k) > 50) {
        return Err("Keywords must be between 1 and 50 characters".to_string());
    }
    Ok(())
}

pub fn tag_ids(values: &[Uuid]) -> Result<(), String> {
    if values.len() > 10 {
        return Err("Maximum 10 tags allowed".to_string());
    }
    Ok(())
}

pub fn tag_name(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("Tag name is required".to_string());
    }
    if char_len(value) > 50 {
        return Err("Tag name must be less than 50 characters".to_string());
    }
    if !TAG_NAME_REGEX.is_match(value) {
        return Err(
            "Tag name can only contain letters, numbers, spaces, and hyphens".to_string(),
        );
    }
    Ok(())
}

pub fn color(value: &str) -> Result<(), String> {
    if !COLOR_REGEX.is_match(value) {
        return Err("Color must be a valid hex color (e.g., #FF0000)".to_string());
    }
    Ok(())
}

// --- Payload Validation ---

impl Validate for CreatePostRequest {
    fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        v.check("title", title(&self.title))
            .check("slug", slug(&self.slug))
            .check_opt("excerpt", self.excerpt.as_deref(), excerpt)
            .check("content", content(&self.content))
            .check_opt("meta_title", self.meta_title.as_deref(), meta_title)
            .check_opt(
                "meta_description",
                self.meta_description.as_deref(),
                meta_description,
            )
            .check("keywords", keywords(&self.keywords))
            .check("tag_ids", tag_ids(&self.tag_ids));
        v.finish(self)
    }
}

impl Validate for UpdatePostRequest {
    fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        v.check_opt("title", self.title.as_deref(), title)
            .check_opt("slug", self.slug.as_deref(), slug)
            .check_opt("excerpt", self.excerpt.as_deref(), excerpt)
            .check_opt("content", self.content.as_deref(), content)
            .check_opt("meta_title", self.meta_title.as_deref(), meta_title)
            .check_opt(
                "meta_description",
                self.meta_description.as_deref(),
                meta_description,
            )
            .check_opt("keywords", self.keywords.as_deref(), keywords)
            .check_opt("tag_ids", self.tag_ids.as_deref(), tag_ids);
        v.finish(self)
    }
}

impl Validate for CreateTagRequest {
    fn validate(self) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        v.check("name", tag_name(&self.name))
            .check("slug", slug(&self.slug))
            .check_opt("description", self.description.as_deref(), max_len(200))
            .check_opt("color", self.color.as_deref(), color);
        v.finish(self)
    }
}
