//! Server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What to do with string fields longer than their column cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlongPolicy {
    /// Cut the value down to the cap
    Truncate,
    /// Fail the request with `field_too_long`
    Reject,
}

impl std::str::FromStr for OverlongPolicy {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncate" => Ok(Self::Truncate),
            "reject" => Ok(Self::Reject),
            other => Err(format!("OVERLONG_FIELDS must be truncate or reject, got {other:?}").into()),
        }
    }
}

/// Server configuration, read once at startup
#[derive(Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP listening port
    pub http_port: u16,
    /// MySQL host
    pub db_host: String,
    /// MySQL port
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    /// Connect / pool acquire timeout
    pub db_connect_timeout: Duration,
    /// Maximum pooled connections
    pub db_max_connections: u32,
    /// Shared secret expected in `x-api-key`
    pub api_key: String,
    /// Number of reverse proxies whose X-Forwarded-For entry is trusted
    pub trusted_proxy_hops: usize,
    /// Requests allowed per identity per window
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Request body cap in bytes
    pub body_limit_bytes: usize,
    pub overlong_policy: OverlongPolicy,
    /// "What is my IP" service used by /api/my-ip
    pub ip_probe_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("http_port", &self.http_port)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_name", &self.db_name)
            .field("db_max_connections", &self.db_max_connections)
            .field("trusted_proxy_hops", &self.trusted_proxy_hops)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("overlong_policy", &self.overlong_policy)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        Ok(Self {
            http_port: parse_or(&lookup, "PORT", 3000)?,
            db_host: lookup("DB_HOST")
                .filter(|s| !s.is_empty())
                .ok_or("DB_HOST must be set")?,
            db_port: parse_or(&lookup, "DB_PORT", 3306)?,
            db_user: lookup("DB_USER").unwrap_or_else(|| "root".into()),
            db_password: lookup("DB_PASS").unwrap_or_default(),
            db_name: lookup("DB_NAME").unwrap_or_else(|| "derione".into()),
            db_connect_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_MS",
                10_000,
            )?),
            db_max_connections: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
            api_key: require_secret(&lookup, "API_KEY")?,
            trusted_proxy_hops: parse_or(&lookup, "TRUST_PROXY_HOPS", 0)?,
            rate_limit_max: parse_or(&lookup, "RATE_LIMIT_MAX", 120)?,
            rate_limit_window: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                60,
            )?),
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", 200 * 1024)?,
            overlong_policy: parse_or(&lookup, "OVERLONG_FIELDS", OverlongPolicy::Truncate)?,
            ip_probe_url: lookup("IP_PROBE_URL")
                .unwrap_or_else(|| "https://api.ipify.org?format=json".into()),
            environment,
        })
    }
}

/// Require a secret: must be set and non-empty in every environment.
fn require_secret<F>(lookup: &F, name: &str) -> Result<String, BoxError>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(name).ok_or_else(|| format!("{name} must be set"))?;
    if val.trim().is_empty() {
        return Err(format!("{name} must not be empty").into());
    }
    Ok(val)
}

/// Parse an optional variable, falling back to `default` when unset or empty.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, BoxError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{name}: invalid value {raw:?}: {e}").into()),
        None => Ok(default),
    }
}
