//! Application state for derione-api

use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::RateLimiter;
use crate::config::{Config, OverlongPolicy};
use crate::db::{MySqlStore, ReservationStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Timeout of the outbound-IP probe
const IP_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state, injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// Reservation persistence (MySQL pool in production)
    pub store: Arc<dyn ReservationStore>,
    /// Fixed-window rate limiter for all routes
    pub rate_limiter: RateLimiter,
    /// Shared secret for the reservation routes
    pub api_key: Arc<str>,
    pub overlong_policy: OverlongPolicy,
    /// Database address, probed by /api/tcp-test
    pub db_host: String,
    pub db_port: u16,
    /// HTTP client for the outbound-IP probe
    pub http: reqwest::Client,
    pub ip_probe_url: String,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// Create a new AppState backed by a MySQL pool
    pub fn new(config: &Config, pool: MySqlPool) -> Result<Self, BoxError> {
        Self::with_store(config, Arc::new(MySqlStore::new(pool)))
    }

    /// Create an AppState over any store
    pub fn with_store(config: &Config, store: Arc<dyn ReservationStore>) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(IP_PROBE_TIMEOUT)
            .build()?;

        Ok(Self {
            store,
            rate_limiter: RateLimiter::new(
                config.rate_limit_max,
                config.rate_limit_window,
                config.trusted_proxy_hops,
            ),
            api_key: Arc::from(config.api_key.as_str()),
            overlong_policy: config.overlong_policy,
            db_host: config.db_host.clone(),
            db_port: config.db_port,
            http,
            ip_probe_url: config.ip_probe_url.clone(),
            body_limit_bytes: config.body_limit_bytes,
        })
    }
}
