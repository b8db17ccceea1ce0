//! Database access layer
//!
//! Handlers never touch the pool directly: they go through a
//! [`ReservationStore`], which is backed by MySQL in production and by
//! [`memory::MemoryStore`] in tests.

pub mod memory;
pub mod reservations;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::reservation::{NewReservation, Reservation};

pub use memory::MemoryStore;
pub use reservations::MySqlStore;

/// Storage failure with the upstream diagnostics kept for operators
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// Driver or SQLSTATE code when one is available
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let code = match &e {
            sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
            sqlx::Error::PoolTimedOut => Some("POOL_TIMED_OUT".to_string()),
            sqlx::Error::PoolClosed => Some("POOL_CLOSED".to_string()),
            sqlx::Error::Io(io) => Some(format!("{:?}", io.kind())),
            sqlx::Error::Tls(_) => Some("TLS".to_string()),
            sqlx::Error::Protocol(_) => Some("PROTOCOL".to_string()),
            sqlx::Error::RowNotFound => Some("ROW_NOT_FOUND".to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Some("DECODE".to_string())
            }
            _ => None,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for reservations
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Trivial round trip (`SELECT 1`)
    async fn ping(&self) -> StoreResult<()>;

    /// All reservations of a restaurant on a date, ordered by time
    async fn list(&self, restaurant_id: i64, date: NaiveDate) -> StoreResult<Vec<Reservation>>;

    /// Insert one reservation, returning the store-assigned id
    async fn insert(&self, data: &NewReservation) -> StoreResult<u64>;
}
