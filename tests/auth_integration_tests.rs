use astroblog::{
    auth::{
        Claims, JwtSessionProvider, Principal, Role, SessionContext, SessionError,
        SessionProvider, SessionResolver, session::derive_username,
    },
    config::{AppConfig, Env},
    repository::{InMemoryRepository, RepositoryState},
};
use axum::http::{HeaderMap, HeaderValue, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const COOKIE_NAME: &str = "astroblog.session-token";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn claims(sub: &str, role: Option<Role>, exp_offset: i64) -> Claims {
    let now = now();
    Claims {
        sub: sub.to_string(),
        role,
        username: None,
        email: None,
        iat: Some(now as usize),
        exp: (now + exp_offset) as usize,
    }
}

fn create_token(claims: &Claims, secret: &str) -> String {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key).unwrap()
}

fn provider(env: Env) -> JwtSessionProvider {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    let users = Arc::new(InMemoryRepository::seeded()) as RepositoryState;
    JwtSessionProvider::new(&config, users)
}

// --- JWT Provider ---

#[tokio::test]
async fn test_valid_bearer_token_resolves_principal() {
    let mut c = claims("user-123", Some(Role::Editor), 3600);
    c.username = Some("writer".to_string());
    let ctx = SessionContext::with_bearer(create_token(&c, TEST_JWT_SECRET));

    let principal = provider(Env::Production).resolve(&ctx).await.unwrap();

    assert_eq!(
        principal,
        Some(Principal {
            id: "user-123".to_string(),
            role: Role::Editor,
            username: Some("writer".to_string()),
        })
    );
}

#[tokio::test]
async fn test_missing_role_defaults_to_user_and_username_from_email() {
    let mut c = claims("user-9", None, 3600);
    c.email = Some("jane.doe@example.com".to_string());
    let ctx = SessionContext::with_bearer(create_token(&c, TEST_JWT_SECRET));

    let principal = provider(Env::Production)
        .resolve(&ctx)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(principal.role, Role::User);
    assert_eq!(principal.username.as_deref(), Some("jane.doe"));
}

#[tokio::test]
async fn test_no_credentials_is_anonymous_not_error() {
    let result = provider(Env::Production)
        .resolve(&SessionContext::anonymous())
        .await;
    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    // Well past the default 60s leeway.
    let c = claims("user-123", Some(Role::Admin), -3600);
    let ctx = SessionContext::with_bearer(create_token(&c, TEST_JWT_SECRET));

    let result = provider(Env::Production).resolve(&ctx).await;
    assert_eq!(result, Err(SessionError::Expired));
}

#[tokio::test]
async fn test_wrong_signature_is_rejected() {
    let c = claims("user-123", Some(Role::Admin), 3600);
    let ctx = SessionContext::with_bearer(create_token(&c, "some-other-secret"));

    let result = provider(Env::Production).resolve(&ctx).await;
    assert!(matches!(result, Err(SessionError::InvalidToken(_))));
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let ctx = SessionContext::with_bearer("not-a-jwt");
    let result = provider(Env::Production).resolve(&ctx).await;
    assert!(matches!(result, Err(SessionError::InvalidToken(_))));
}

// --- Resolver ---

#[tokio::test]
async fn test_resolver_absorbs_provider_failures() {
    let resolver = SessionResolver::new(Arc::new(provider(Env::Production)));

    let expired = claims("user-123", Some(Role::Admin), -3600);
    let expired = SessionContext::with_bearer(create_token(&expired, TEST_JWT_SECRET));
    assert_eq!(resolver.current_principal(&expired).await, None);

    let garbage = SessionContext::with_bearer("garbage");
    assert_eq!(resolver.current_principal(&garbage).await, None);

    let valid = claims("user-123", Some(Role::User), 3600);
    let valid = SessionContext::with_bearer(create_token(&valid, TEST_JWT_SECRET));
    assert_eq!(
        resolver.current_principal(&valid).await.map(|p| p.id),
        Some("user-123".to_string())
    );
}

// --- Session Context Extraction ---

#[tokio::test]
async fn test_session_cookie_is_used_without_bearer() {
    let token = create_token(&claims("cookie-user", None, 3600), TEST_JWT_SECRET);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("theme=dark; {}={}", COOKIE_NAME, token)).unwrap(),
    );

    let ctx = SessionContext::from_headers(&headers, COOKIE_NAME);
    let principal = provider(Env::Production)
        .resolve(&ctx)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(principal.id, "cookie-user");
}

#[test]
fn test_bearer_token_takes_precedence_over_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer from-header"),
    );
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{}=from-cookie", COOKIE_NAME)).unwrap(),
    );

    let ctx = SessionContext::from_headers(&headers, COOKIE_NAME);
    assert_eq!(ctx.token(), Some("from-header"));
}

#[test]
fn test_non_bearer_authorization_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let ctx = SessionContext::from_headers(&headers, COOKIE_NAME);
    assert_eq!(ctx.token(), None);
}

#[tokio::test]
async fn test_empty_bearer_falls_back_to_cookie() {
    let token = create_token(&claims("cookie-user", None, 3600), TEST_JWT_SECRET);
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{}={}", COOKIE_NAME, token)).unwrap(),
    );

    let ctx = SessionContext::from_headers(&headers, COOKIE_NAME);
    assert_eq!(ctx.token(), Some(token.as_str()));

    let principal = provider(Env::Production)
        .resolve(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.id, "cookie-user");
}

#[tokio::test]
async fn test_token_without_iat_resolves() {
    let payload = serde_json::json!({
        "sub": "no-iat-user",
        "role": "EDITOR",
        "exp": (now() + 3600) as usize,
    });
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let token = encode(&Header::default(), &payload, &key).unwrap();

    let principal = provider(Env::Production)
        .resolve(&SessionContext::with_bearer(token))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(principal.id, "no-iat-user");
    assert_eq!(principal.role, Role::Editor);
}

#[test]
fn test_debug_output_redacts_tokens() {
    let ctx = SessionContext::with_bearer("super-secret-token-value");
    let debug = format!("{:?}", ctx);
    assert!(!debug.contains("super-secret-token-value"));
    assert!(debug.contains("has_bearer_token: true"));
}

// --- Local Bypass ---

#[tokio::test]
async fn test_local_bypass_resolves_known_user() {
    let ctx = SessionContext::with_dev_user("admin-1");

    let principal = provider(Env::Local).resolve(&ctx).await.unwrap().unwrap();

    assert_eq!(principal.id, "admin-1");
    assert_eq!(principal.role, Role::Admin);
    assert_eq!(principal.username.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_local_bypass_unknown_user_falls_through() {
    let ctx = SessionContext::with_dev_user("nobody");
    assert_eq!(provider(Env::Local).resolve(&ctx).await, Ok(None));
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let ctx = SessionContext::with_dev_user("admin-1");
    assert_eq!(provider(Env::Production).resolve(&ctx).await, Ok(None));
}

// --- Username Derivation ---

#[test]
fn test_derive_username() {
    assert_eq!(
        derive_username(Some("handle".to_string()), Some("x@y.z")),
        Some("handle".to_string())
    );
    assert_eq!(
        derive_username(None, Some("likes.rust@example.com")),
        Some("likes.rust".to_string())
    );
    assert_eq!(
        derive_username(Some(String::new()), Some("fallback@example.com")),
        Some("fallback".to_string())
    );
    assert_eq!(derive_username(None, Some("@example.com")), None);
    assert_eq!(derive_username(None, None), None);
}
