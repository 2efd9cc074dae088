use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, sync::Arc};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use super::role::Role;
use crate::{
    config::{AppConfig, Env},
    models::User,
    repository::RepositoryState,
};

/// Header carrying a user id for the local development bypass.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Principal
///
/// The authenticated identity resolved for the current request.
/// Built fresh from session data on every request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Principal {
    /// Opaque identifier. Ownership checks compare it with exact equality.
    pub id: String,
    pub role: Role,
    /// Display handle: the username claim, or the local part of the e-mail address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        let username = derive_username(user.username, Some(&user.email));
        Principal {
            id: user.id,
            role: user.role,
            username,
        }
    }
}

/// Picks the explicit username when present, otherwise the local part of `email`.
pub fn derive_username(username: Option<String>, email: Option<&str>) -> Option<String> {
    username.filter(|name| !name.is_empty()).or_else(|| {
        email
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_string)
    })
}

/// Claims
///
/// Payload of a session JWT. `role` and `username` are optional; a token without a
/// role resolves to [`Role::User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the principal id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration Time (exp). Always validated.
    pub exp: usize,
    /// Issued At (iat). Informational only, so tokens without it still resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

impl Claims {
    pub fn into_principal(self) -> Principal {
        let username = derive_username(self.username, self.email.as_deref());
        Principal {
            id: self.sub,
            role: self.role.unwrap_or_default(),
            username,
        }
    }
}

/// SessionContext
///
/// The request-scoped credentials a [`SessionProvider`] resolves into a [`Principal`].
/// Handlers receive it as an extractor and pass it explicitly to the gates, so
/// authorization never reads process-wide state.
#[derive(Clone, Default)]
pub struct SessionContext {
    bearer_token: Option<String>,
    session_cookie: Option<String>,
    dev_user_id: Option<String>,
}

impl SessionContext {
    /// A context carrying no credentials at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_dev_user(id: impl Into<String>) -> Self {
        Self {
            dev_user_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Reads the bearer token, the session cookie named `cookie_name` and the
    /// development user header from `headers`.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        Self {
            bearer_token: extract_bearer_token(headers),
            session_cookie: extract_session_cookie(headers, cookie_name),
            dev_user_id: headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }
    }

    /// The session token, preferring the Authorization header over the cookie.
    pub fn token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .or(self.session_cookie.as_deref())
    }

    pub fn dev_user_id(&self) -> Option<&str> {
        self.dev_user_id.as_deref()
    }
}

// Token values must never reach the logs.
impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("has_bearer_token", &self.bearer_token.is_some())
            .field("has_session_cookie", &self.session_cookie.is_some())
            .field("dev_user_id", &self.dev_user_id)
            .finish()
    }
}

/// Extracts `Authorization: Bearer <token>`. An empty token counts as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Finds the cookie named `cookie_name` in the Cookie header.
pub fn extract_session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == cookie_name).then(|| value.to_string())
        })
}

/// SessionContext Extractor
///
/// Never rejects: a request without credentials yields an anonymous context, and the
/// decision to deny is left to the gates.
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(SessionContext::from_headers(
            &parts.headers,
            &config.session_cookie_name,
        ))
    }
}

/// Failures of the underlying session provider. The resolver absorbs all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("session backend unavailable: {0}")]
    Unavailable(String),
}

/// SessionProvider Trait
///
/// The single query the authorization core consumes from the auth provider:
/// resolve a context to an identity, report that no credentials were presented
/// (`Ok(None)`), or fail.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, ctx: &SessionContext) -> Result<Option<Principal>, SessionError>;
}

pub type SessionProviderState = Arc<dyn SessionProvider>;

/// JwtSessionProvider
///
/// Resolves stateless HS256 session tokens. In `Env::Local` a known user id in the
/// `x-user-id` header is accepted as well; the id must exist in the user directory.
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
    env: Env,
    users: RepositoryState,
}

impl JwtSessionProvider {
    pub fn new(config: &AppConfig, users: RepositoryState) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            env: config.env.clone(),
            users,
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn resolve(&self, ctx: &SessionContext) -> Result<Option<Principal>, SessionError> {
        if self.env == Env::Local {
            if let Some(user_id) = ctx.dev_user_id() {
                if let Some(user) = self.users.get_user(user_id).await {
                    return Ok(Some(Principal::from(user)));
                }
            }
        }

        let Some(token) = ctx.token() else {
            return Ok(None);
        };

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken(e.to_string()),
            },
        )?;

        Ok(Some(token_data.claims.into_principal()))
    }
}

/// SessionResolver
///
/// Turns the provider's answer into "principal or anonymous". Provider failures are
/// logged and treated exactly like a missing session, so callers never fail because
/// the lookup did.
#[derive(Clone)]
pub struct SessionResolver {
    provider: SessionProviderState,
}

impl SessionResolver {
    pub fn new(provider: SessionProviderState) -> Self {
        Self { provider }
    }

    pub async fn current_principal(&self, ctx: &SessionContext) -> Option<Principal> {
        match self.provider.resolve(ctx).await {
            Ok(principal) => principal,
            Err(error) => {
                tracing::warn!(%error, "session lookup failed, treating request as anonymous");
                None
            }
        }
    }
}
