//! Reservation Model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reservation row (Prenotazioni)
///
/// Serialized with the table's column names, so list responses keep the
/// shape clients already consume (`OraPren`, `DataPren`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "PRistorante")]
    pub restaurant_id: i64,
    #[serde(rename = "DataPren")]
    pub date: NaiveDate,
    #[serde(rename = "OraPren")]
    pub time: NaiveTime,
    /// Nullable on read: the table is also written by other systems
    #[serde(rename = "Nome")]
    pub first_name: Option<String>,
    #[serde(rename = "Cognome")]
    pub last_name: Option<String>,
    #[serde(rename = "Telefono")]
    pub phone: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Coperti")]
    pub covers: Option<i64>,
    #[serde(rename = "Seggiolini")]
    pub high_chairs: Option<i64>,
    #[serde(rename = "Fonte")]
    pub source: Option<String>,
    #[serde(rename = "Stato")]
    pub status: Option<String>,
    #[serde(rename = "Nota")]
    pub note: Option<String>,
    #[serde(rename = "Prezzo")]
    pub price: Option<Decimal>,
    #[serde(rename = "Tavolo")]
    pub table: Option<String>,
    #[serde(rename = "PCliente")]
    pub customer_id: Option<i64>,
    #[serde(rename = "CodeID")]
    pub external_code: Option<String>,
    /// Written by the review system, never by this API
    #[serde(rename = "Voto")]
    pub rating: Option<i64>,
    #[serde(rename = "Commento")]
    pub comment: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Reservation {
    /// Row as it reads back right after insertion of `data`
    pub fn from_new(id: u64, data: &NewReservation) -> Self {
        Self {
            id,
            restaurant_id: data.restaurant_id,
            date: data.date,
            time: data.time,
            first_name: Some(data.first_name.clone()),
            last_name: Some(data.last_name.clone()),
            phone: Some(data.phone.clone()),
            email: Some(data.email.clone()),
            covers: Some(data.covers),
            high_chairs: Some(data.seggiolini),
            source: Some(data.fonte.clone()),
            status: Some(data.stato.clone()),
            note: Some(data.nota.clone()),
            price: Some(data.prezzo),
            table: Some(data.tavolo.clone()),
            customer_id: Some(data.pcliente),
            external_code: Some(data.code_id.clone()),
            rating: None,
            comment: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Create reservation payload, as received
///
/// Values are kept as raw JSON so the service can apply its coercion and
/// presence rules (numbers may arrive as strings, `0`/`""` count as absent).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReservationCreate {
    pub restaurant_id: Option<Value>,
    pub date: Option<Value>,
    pub time: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub phone: Option<Value>,
    pub email: Option<Value>,
    pub covers: Option<Value>,
    #[serde(alias = "high_chairs")]
    pub seggiolini: Option<Value>,
    #[serde(alias = "source")]
    pub fonte: Option<Value>,
    #[serde(alias = "status")]
    pub stato: Option<Value>,
    #[serde(alias = "note")]
    pub nota: Option<Value>,
    #[serde(alias = "price")]
    pub prezzo: Option<Value>,
    #[serde(alias = "table")]
    pub tavolo: Option<Value>,
    #[serde(alias = "customer_id")]
    pub pcliente: Option<Value>,
    #[serde(alias = "external_code")]
    pub code_id: Option<Value>,
}

/// Validated and normalized reservation, ready to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub covers: i64,
    pub seggiolini: i64,
    pub fonte: String,
    pub stato: String,
    pub nota: String,
    pub prezzo: Decimal,
    pub tavolo: String,
    pub pcliente: i64,
    pub code_id: String,
}

/// Create response: assigned id plus the normalized payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreated {
    pub id: u64,
    pub message: String,
    #[serde(flatten)]
    pub reservation: NewReservation,
}

/// List query parameters, as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationQuery {
    pub restaurant_id: Option<String>,
    pub date: Option<String>,
}

/// List response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationList {
    pub items: Vec<Reservation>,
}
