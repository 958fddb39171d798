//! VacQ API: hospitals, vaccination appointments and user auth over JSON/HTTP.

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;

use crate::auth::JwtManager;
use crate::config::Config;
use crate::middleware::{RateLimiter, SecurityHeaders};
use crate::repository::{
    AppointmentRepository, AppointmentRepositoryImpl, HospitalRepository, HospitalRepositoryImpl,
    UserRepository, UserRepositoryImpl,
};

/// JSON bodies larger than this are rejected before reaching a handler.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hospitals: Arc<dyn HospitalRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: JwtManager,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn from_pool(config: Config, pool: PgPool) -> Self {
        let jwt = JwtManager::new(&config.jwt);
        let rate_limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config: Arc::new(config),
            hospitals: Arc::new(HospitalRepositoryImpl::new(pool.clone())),
            appointments: Arc::new(AppointmentRepositoryImpl::new(pool.clone())),
            users: Arc::new(UserRepositoryImpl::new(pool)),
            jwt,
            rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Very permissive CORS, matching a public read API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .nest("/hospitals", routes::hospitals::router(state.clone()))
        .nest("/appointments", routes::appointments::router(state.clone()))
        .nest("/auth", routes::auth::router(state.clone()));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api/v1", api)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", openapi::ApiDoc::build()))
        .layer(from_fn_with_state(
            state.rate_limiter.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(from_fn_with_state(
            SecurityHeaders::for_config(&state.config),
            middleware::security_headers_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(from_fn(middleware::normalize_error_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
