//! Request hardening middleware

pub mod error_response;
pub mod rate_limit;
pub mod security_headers;

pub use error_response::normalize_error_response;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use security_headers::{security_headers_middleware, SecurityHeaders};
