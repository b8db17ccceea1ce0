//! In-process reservation store
//!
//! Same contract as the MySQL store, kept in memory. Used by the test suite
//! and for running the API without a database.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::reservation::{NewReservation, Reservation};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ReservationStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    rows: Vec<Reservation>,
    next_id: u64,
    /// When set, every operation fails with this error
    failure: Option<StoreError>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail (simulates a down database)
    pub async fn fail_with(&self, error: StoreError) {
        self.inner.write().await.failure = Some(error);
    }

    pub async fn recover(&self) {
        self.inner.write().await.failure = None;
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        match &self.inner.read().await.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn list(&self, restaurant_id: i64, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        let inner = self.inner.read().await;
        if let Some(e) = &inner.failure {
            return Err(e.clone());
        }
        let mut rows: Vec<Reservation> = inner
            .rows
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id && r.date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, data: &NewReservation) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        if let Some(e) = &inner.failure {
            return Err(e.clone());
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(Reservation::from_new(id, data));
        Ok(id)
    }
}
