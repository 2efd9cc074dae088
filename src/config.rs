use std::env;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const SESSION_COOKIE_BASE: &str = "astroblog.session-token";

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// pulled into handlers and extractors via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the dev bypass and cookie hardening.
    pub env: Env,
    // Secret used to verify session JWTs (HS256).
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Name of the cookie carrying the session token.
    pub session_cookie_name: String,
}

/// Env
///
/// Switches between development conveniences (x-user-id bypass, pretty logs)
/// and the hardened production setup.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    /// Production cookies carry the `__Secure-` prefix.
    pub fn session_cookie_name(&self) -> String {
        match self {
            Env::Local => SESSION_COOKIE_BASE.to_string(),
            Env::Production => format!("__Secure-{}", SESSION_COOKIE_BASE),
        }
    }
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            session_cookie_name: Env::Local.session_cookie_name(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics in production when `SESSION_JWT_SECRET` is not set, so the server never
    /// starts with a guessable signing secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            session_cookie_name: env.session_cookie_name(),
            env,
            jwt_secret,
            bind_addr,
        }
    }
}
