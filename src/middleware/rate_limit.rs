//! Per-client fixed-window rate limiting
//!
//! Clients are keyed by the socket peer address. With `trust_proxy` set the
//! first `X-Forwarded-For` address, then `X-Real-IP`, take precedence.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::config::RateLimitConfig;
use crate::error::{AppError, Result};

/// Most clients tracked at once; beyond this the oldest windows are evicted.
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_clients: usize,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_clients: MAX_TRACKED_CLIENTS,
        }
    }

    /// A limiter that lets everything through.
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig {
            enabled: false,
            ..Default::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn trusts_proxy(&self) -> bool {
        self.config.trust_proxy
    }

    /// Record a request for `key`. On rejection returns the seconds until
    /// the window resets.
    pub fn check(&self, key: &str) -> std::result::Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> std::result::Result<(), u64> {
        if !self.config.enabled {
            return Ok(());
        }
        let window_len = Duration::from_secs(self.config.window_secs);
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if !windows.contains_key(key) && windows.len() >= self.max_clients {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
            while windows.len() >= self.max_clients {
                let oldest = windows
                    .iter()
                    .min_by_key(|(_, w)| w.started)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        windows.remove(&k);
                    }
                    None => break,
                }
            }
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= window_len {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.config.max_requests {
            let remaining = window_len.saturating_sub(now.duration_since(window.started));
            return Err(remaining.as_secs().max(1));
        }
        window.count += 1;
        Ok(())
    }
}

fn client_key(request: &Request, trust_proxy: bool) -> String {
    let headers = request.headers();
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(ip.to_string());
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if limiter.is_enabled() {
        let key = client_key(&request, limiter.trusts_proxy());
        if let Err(retry_after_secs) = limiter.check(&key) {
            tracing::warn!(client = %key, "rate limit exceeded");
            return Err(AppError::TooManyRequests { retry_after_secs });
        }
    }
    Ok(next.run(request).await)
}
