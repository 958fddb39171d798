//! Process configuration, read once at startup.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub port: u16,
    pub environment: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Admin account ensured at startup, when both email and password are set.
    pub admin_seed: Option<AdminSeed>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub expire_secs: i64,
    pub cookie_expire_days: i64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_requests: u64,
    /// Key clients by `X-Forwarded-For`/`X-Real-IP`. Only safe behind a proxy
    /// that overwrites those headers.
    pub trust_proxy: bool,
}

#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 10 * 60,
            max_requests: 100,
            trust_proxy: false,
        }
    }
}

/// Read `name`, falling back to `default`, and parse it. A value that is set
/// but unparseable is an error rather than a silent fallback.
fn env_parse<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("Invalid {}", name))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", "5000")?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", "10")?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                expire_secs: env_parse("JWT_EXPIRE_SECS", "2592000")?,
                cookie_expire_days: env_parse("JWT_COOKIE_EXPIRE_DAYS", "30")?,
            },
            rate_limit: RateLimitConfig {
                enabled: env::var("RATE_LIMIT_ENABLED")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", "600")?,
                max_requests: env_parse("RATE_LIMIT_MAX", "100")?,
                trust_proxy: env::var("RATE_LIMIT_TRUST_PROXY")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            },
            admin_seed: match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
                (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                    Some(AdminSeed {
                        name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                        email,
                        password,
                    })
                }
                _ => None,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.port)
    }
}
