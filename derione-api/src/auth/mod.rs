//! Request guards: rate limiting for every route, API key for reservations

pub mod api_key;
pub mod rate_limit;

pub use api_key::api_key_middleware;
pub use rate_limit::{RateLimiter, rate_limit_middleware};
