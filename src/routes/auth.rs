// src/routes/auth.rs

use axum::{
    extract::State,
    http::header,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::auth::{self, CurrentUser};
use crate::error::{AppError, Result};
use crate::models::{LoginInput, NewUser, RegisterInput, Role, TokenResponse, User};
use crate::AppState;

/// Routes mounted under `/api/v1/auth`.
pub fn router(state: AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(state, auth::protect));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .merge(me)
}

fn token_response(state: &AppState, user: &User) -> Result<impl IntoResponse> {
    let token = state.jwt.issue(user.id)?;
    let cookie = auth::token_cookie(&token, &state.config);
    Ok(([(header::SET_COOKIE, cookie)], Json(TokenResponse { token })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterInput,
    responses(
        (status = 200, description = "Registered; token issued", body = TokenResponse),
        (status = 400, description = "Validation failed or email taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse> {
    body.validate()?;
    let password_hash = auth::hash_password(&body.password)?;
    let user = state
        .users
        .create(&NewUser {
            name: body.name.trim().to_string(),
            tel: body.tel,
            email: body.email.trim().to_lowercase(),
            role: Role::User,
            password_hash,
        })
        .await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    token_response(&state, &user)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Logged in; token issued", body = TokenResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide an email and password".to_string(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
    let user = state.users.find_by_email(&email).await?.ok_or_else(invalid)?;
    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }
    token_response(&state, &user)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "The logged-in user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(current: CurrentUser) -> Json<User> {
    Json(current.0)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Token cookie cleared"))
)]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, auth::cleared_cookie())],
        Json(serde_json::json!({})),
    )
}
