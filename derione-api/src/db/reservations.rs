//! Reservation database operations (MySQL, table `Prenotazioni`)

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::reservation::{NewReservation, Reservation};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use super::{ReservationStore, StoreResult};
use crate::config::Config;

/// Casts keep decoding stable regardless of the exact integer widths and
/// signedness the table was created with.
const SELECT_COLUMNS: &str = r#"
    CAST(ID AS UNSIGNED) AS id,
    CAST(PRistorante AS SIGNED) AS restaurant_id,
    DataPren AS date,
    OraPren AS time,
    Nome AS first_name,
    Cognome AS last_name,
    Telefono AS phone,
    Email AS email,
    CAST(Coperti AS SIGNED) AS covers,
    CAST(Seggiolini AS SIGNED) AS high_chairs,
    Fonte AS source,
    Stato AS status,
    Nota AS note,
    CAST(Prezzo AS DECIMAL(10, 2)) AS price,
    Tavolo AS `table`,
    CAST(PCliente AS SIGNED) AS customer_id,
    CodeID AS external_code,
    CAST(Voto AS SIGNED) AS rating,
    Commento AS comment,
    CAST(CreatedAt AS DATETIME) AS created_at,
    CAST(UpdatedAt AS DATETIME) AS updated_at
"#;

/// Build the connection pool from config.
///
/// The pool connects lazily: a down database shows up in `/api/health`
/// instead of preventing startup.
pub fn connect_pool(config: &Config) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(&config.db_password)
        .database(&config.db_name)
        .charset("utf8mb4");

    MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_connect_timeout)
        .idle_timeout(std::time::Duration::from_secs(600))
        .connect_lazy_with(options)
}

// ── Queries ──

pub async fn ping(pool: &MySqlPool) -> StoreResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn list_reservations(
    pool: &MySqlPool,
    restaurant_id: i64,
    date: NaiveDate,
) -> StoreResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM Prenotazioni \
         WHERE PRistorante = ? AND DataPren = ? \
         ORDER BY OraPren ASC, ID ASC"
    );
    let rows: Vec<Reservation> = sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create_reservation(pool: &MySqlPool, data: &NewReservation) -> StoreResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO Prenotazioni (
            PRistorante, DataPren, OraPren, Nome, Cognome,
            Telefono, Email, Coperti, Seggiolini,
            Fonte, Stato, Nota, Prezzo, Tavolo,
            PCliente, CodeID
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(data.restaurant_id)
    .bind(data.date)
    .bind(data.time)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(data.covers)
    .bind(data.seggiolini)
    .bind(&data.fonte)
    .bind(&data.stato)
    .bind(&data.nota)
    .bind(data.prezzo)
    .bind(&data.tavolo)
    .bind(data.pcliente)
    .bind(&data.code_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_id())
}

/// [`ReservationStore`] backed by a MySQL pool
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for MySqlStore {
    async fn ping(&self) -> StoreResult<()> {
        ping(&self.pool).await
    }

    async fn list(&self, restaurant_id: i64, date: NaiveDate) -> StoreResult<Vec<Reservation>> {
        list_reservations(&self.pool, restaurant_id, date).await
    }

    async fn insert(&self, data: &NewReservation) -> StoreResult<u64> {
        create_reservation(&self.pool, data).await
    }
}
