//! Authentication and role gate for protected routes
//!
//! `protect` resolves the caller from a Bearer token (or the `token` cookie)
//! and stores it in the request extensions. `require_roles` runs after it and
//! rejects callers whose role is not in the allowed set.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

/// The authenticated caller, inserted by `protect`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(not_authorized)
    }
}

fn not_authorized() -> AppError {
    AppError::Unauthorized("Not authorized to access this route".to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty() && v != "none")
}

/// Resolve a token to a stored user.
pub async fn authenticate(state: &AppState, token: &str) -> Result<User> {
    let claims = state.jwt.verify(token).map_err(|_| not_authorized())?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| not_authorized())?;
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(not_authorized)
}

/// Check a user's role against the allowed set.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )))
    }
}

/// Authentication middleware
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())
        .or_else(|| cookie_token(request.headers()))
        .ok_or_else(not_authorized)?;

    let user = authenticate(&state, &token).await?;
    tracing::debug!(user_id = %user.id, role = %user.role, "authenticated");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Role gate; must be layered inside `protect`.
pub async fn require_roles(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(not_authorized)?;
    authorize(&current.0, allowed)?;
    Ok(next.run(request).await)
}

pub fn token_cookie(token: &str, config: &Config) -> String {
    let max_age = config.jwt.cookie_expire_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cleared_cookie() -> String {
    format!("{TOKEN_COOKIE}=none; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
