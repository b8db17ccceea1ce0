//! Reservation business rules: presence checks, coercion, normalization
//!
//! Payload values arrive as raw JSON. Required fields are checked for
//! truthiness first (`null`, `false`, `0` and `""` count as absent), then each
//! field is coerced to its column type and string caps are applied.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::error::{AppError, AppResult};
use shared::models::reservation::{NewReservation, Reservation, ReservationCreate, ReservationQuery};

use crate::config::OverlongPolicy;
use crate::db::ReservationStore;
use crate::error::ServiceResult;

pub const SOURCE_MAX_CHARS: usize = 15;
pub const STATUS_MAX_CHARS: usize = 15;
pub const NOTE_MAX_CHARS: usize = 500;
pub const TABLE_MAX_CHARS: usize = 5;
pub const CODE_ID_MAX_CHARS: usize = 50;

pub const DEFAULT_SOURCE: &str = "API";
pub const DEFAULT_STATUS: &str = "CONFERMATA";

pub const CREATED_MESSAGE: &str = "Reservation created";

// ── Operations ──

/// List reservations of one restaurant on one date.
pub async fn list_reservations(
    store: &dyn ReservationStore,
    query: ReservationQuery,
) -> ServiceResult<Vec<Reservation>> {
    let (restaurant_id, date) = parse_query(query)?;
    let rows = store.list(restaurant_id, date).await?;
    tracing::debug!(restaurant_id, %date, count = rows.len(), "Listed reservations");
    Ok(rows)
}

/// Validate, normalize and insert a reservation.
pub async fn create_reservation(
    store: &dyn ReservationStore,
    payload: ReservationCreate,
    policy: OverlongPolicy,
) -> ServiceResult<(u64, NewReservation)> {
    let data = normalize(payload, policy)?;
    let id = store.insert(&data).await?;
    tracing::info!(
        id,
        restaurant_id = data.restaurant_id,
        date = %data.date,
        covers = data.covers,
        "Reservation created"
    );
    Ok((id, data))
}

// ── Validation ──

/// Parse list query parameters.
pub fn parse_query(query: ReservationQuery) -> AppResult<(i64, NaiveDate)> {
    let restaurant_id = query.restaurant_id.filter(|s| !s.trim().is_empty());
    let date = query.date.filter(|s| !s.trim().is_empty());
    let (Some(restaurant_id), Some(date)) = (restaurant_id, date) else {
        return Err(AppError::missing_params());
    };

    let restaurant_id =
        parse_int_str(&restaurant_id).ok_or_else(|| AppError::invalid_param("restaurant_id"))?;
    let date = parse_date(&date).ok_or_else(|| AppError::invalid_param("date"))?;
    Ok((restaurant_id, date))
}

/// Turn a raw create payload into a row ready for insertion.
pub fn normalize(payload: ReservationCreate, policy: OverlongPolicy) -> AppResult<NewReservation> {
    let required = [
        &payload.restaurant_id,
        &payload.date,
        &payload.time,
        &payload.first_name,
        &payload.phone,
        &payload.covers,
    ];
    if required.into_iter().any(|v| is_falsy(v.as_ref())) {
        return Err(AppError::missing_fields());
    }

    let restaurant_id = coerce_int(payload.restaurant_id.as_ref(), "restaurant_id")?;
    let covers = coerce_int(payload.covers.as_ref(), "covers")?;
    if covers < 1 {
        return Err(AppError::invalid_field("covers"));
    }

    let date = coerce_text(payload.date.as_ref(), "date")?;
    let date = parse_date(&date).ok_or_else(|| AppError::invalid_field("date"))?;

    let time = coerce_text(payload.time.as_ref(), "time")?;
    let time = NaiveTime::parse_from_str(&format!("{}:00", time.trim()), "%H:%M:%S")
        .map_err(|_| AppError::invalid_field("time"))?;

    let first_name = coerce_text(payload.first_name.as_ref(), "first_name")?
        .trim()
        .to_string();
    let phone = coerce_text(payload.phone.as_ref(), "phone")?.trim().to_string();
    if first_name.is_empty() || phone.is_empty() {
        return Err(AppError::missing_fields());
    }

    Ok(NewReservation {
        restaurant_id,
        date,
        time,
        first_name,
        last_name: optional_text(payload.last_name.as_ref(), "last_name", "")?
            .trim()
            .to_string(),
        phone,
        email: optional_text(payload.email.as_ref(), "email", "")?
            .trim()
            .to_string(),
        covers,
        seggiolini: optional_int(payload.seggiolini.as_ref(), "seggiolini")?,
        fonte: cap(
            "fonte",
            optional_text(payload.fonte.as_ref(), "fonte", DEFAULT_SOURCE)?,
            SOURCE_MAX_CHARS,
            policy,
        )?,
        stato: cap(
            "stato",
            optional_text(payload.stato.as_ref(), "stato", DEFAULT_STATUS)?,
            STATUS_MAX_CHARS,
            policy,
        )?,
        nota: cap(
            "nota",
            optional_text(payload.nota.as_ref(), "nota", "")?,
            NOTE_MAX_CHARS,
            policy,
        )?,
        prezzo: optional_decimal(payload.prezzo.as_ref(), "prezzo")?,
        tavolo: cap(
            "tavolo",
            optional_text(payload.tavolo.as_ref(), "tavolo", "")?,
            TABLE_MAX_CHARS,
            policy,
        )?,
        pcliente: optional_int(payload.pcliente.as_ref(), "pcliente")?,
        code_id: cap(
            "code_id",
            optional_text(payload.code_id.as_ref(), "code_id", "")?,
            CODE_ID_MAX_CHARS,
            policy,
        )?,
    })
}

/// `null`, `false`, `0` and `""` are treated like a missing value.
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => false,
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Integer from a decimal string; integral floats ("2.0") are accepted.
fn parse_int_str(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(integral_f64))
}

fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn coerce_int(value: Option<&Value>, field: &str) -> AppResult<i64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
        Some(Value::String(s)) => parse_int_str(s),
        _ => None,
    };
    parsed.ok_or_else(|| AppError::invalid_field(field))
}

fn optional_int(value: Option<&Value>, field: &str) -> AppResult<i64> {
    match value {
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        v if is_absent(v) => Ok(0),
        v => coerce_int(v, field),
    }
}

fn optional_decimal(value: Option<&Value>, field: &str) -> AppResult<Decimal> {
    let raw = match value {
        v if is_absent(v) => return Ok(Decimal::ZERO),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Decimal::ZERO),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Err(AppError::invalid_field(field)),
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| AppError::invalid_field(field))
}

/// Strings pass through; numbers are accepted in their JSON spelling.
fn coerce_text(value: Option<&Value>, field: &str) -> AppResult<String> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(AppError::invalid_field(field)),
    }
}

fn optional_text(value: Option<&Value>, field: &str, default: &str) -> AppResult<String> {
    if is_absent(value) {
        return Ok(default.to_string());
    }
    coerce_text(value, field)
}

/// Apply a character cap according to the configured policy.
fn cap(field: &str, value: String, max: usize, policy: OverlongPolicy) -> AppResult<String> {
    if value.chars().count() <= max {
        return Ok(value);
    }
    match policy {
        OverlongPolicy::Truncate => Ok(value.chars().take(max).collect()),
        OverlongPolicy::Reject => Err(AppError::field_too_long(field, max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::error::ErrorCode;

    fn payload(value: Value) -> ReservationCreate {
        serde_json::from_value(value).unwrap()
    }

    fn minimal() -> Value {
        json!({
            "restaurant_id": 1,
            "date": "2025-03-10",
            "time": "19:30",
            "first_name": "Anna",
            "phone": "555-0100",
            "covers": 2,
        })
    }

    fn with(field: &str, value: Value) -> ReservationCreate {
        let mut body = minimal();
        body[field] = value;
        payload(body)
    }

    fn without(field: &str) -> ReservationCreate {
        let mut body = minimal();
        body.as_object_mut().unwrap().remove(field);
        payload(body)
    }

    fn error_code(result: AppResult<NewReservation>) -> ErrorCode {
        result.unwrap_err().code
    }

    #[test]
    fn test_minimal_payload_gets_defaults() {
        let data = normalize(payload(minimal()), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.restaurant_id, 1);
        assert_eq!(data.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(data.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert_eq!(data.last_name, "");
        assert_eq!(data.email, "");
        assert_eq!(data.seggiolini, 0);
        assert_eq!(data.fonte, "API");
        assert_eq!(data.stato, "CONFERMATA");
        assert_eq!(data.nota, "");
        assert_eq!(data.prezzo, Decimal::ZERO);
        assert_eq!(data.tavolo, "");
        assert_eq!(data.pcliente, 0);
        assert_eq!(data.code_id, "");
    }

    #[test]
    fn test_missing_required_fields() {
        for field in ["restaurant_id", "date", "time", "first_name", "phone", "covers"] {
            assert_eq!(
                error_code(normalize(without(field), OverlongPolicy::Truncate)),
                ErrorCode::MissingFields,
                "{field} absent"
            );
        }
    }

    #[test]
    fn test_falsy_required_fields_count_as_missing() {
        let cases = [
            ("restaurant_id", json!(0)),
            ("covers", json!(0)),
            ("covers", json!(null)),
            ("date", json!("")),
            ("time", json!(false)),
            ("first_name", json!("")),
            ("phone", json!(null)),
        ];
        for (field, value) in cases {
            assert_eq!(
                error_code(normalize(with(field, value.clone()), OverlongPolicy::Truncate)),
                ErrorCode::MissingFields,
                "{field} = {value}"
            );
        }
    }

    #[test]
    fn test_whitespace_only_names_count_as_missing() {
        let result = normalize(with("first_name", json!("   ")), OverlongPolicy::Truncate);
        assert_eq!(error_code(result), ErrorCode::MissingFields);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut body = minimal();
        body["restaurant_id"] = json!("12");
        body["covers"] = json!("4");
        body["seggiolini"] = json!("1");
        body["pcliente"] = json!(33.0);
        body["prezzo"] = json!("25.50");
        let data = normalize(payload(body), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.restaurant_id, 12);
        assert_eq!(data.covers, 4);
        assert_eq!(data.seggiolini, 1);
        assert_eq!(data.pcliente, 33);
        assert_eq!(data.prezzo, Decimal::from_str("25.50").unwrap());
    }

    #[test]
    fn test_uncoercible_values_are_invalid() {
        let cases = [
            ("restaurant_id", json!("abc")),
            ("covers", json!(2.5)),
            ("covers", json!(-3)),
            ("date", json!("10/03/2025")),
            ("time", json!("19:30:00")),
            ("time", json!("25:00")),
            ("prezzo", json!("ten")),
            ("seggiolini", json!(true)),
            ("first_name", json!({"nested": true})),
        ];
        for (field, value) in cases {
            let err = normalize(with(field, value.clone()), OverlongPolicy::Truncate).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFields, "{field} = {value}");
            assert_eq!(err.body()["field"], field);
        }
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let mut body = minimal();
        body["first_name"] = json!("  Anna ");
        body["last_name"] = json!(" Rossi  ");
        body["phone"] = json!(" 555-0100 ");
        body["email"] = json!(" anna@example.com ");
        let data = normalize(payload(body), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.first_name, "Anna");
        assert_eq!(data.last_name, "Rossi");
        assert_eq!(data.phone, "555-0100");
        assert_eq!(data.email, "anna@example.com");
    }

    #[test]
    fn test_caps_truncate_by_default() {
        let mut body = minimal();
        body["nota"] = json!("x".repeat(600));
        body["fonte"] = json!("WEBSITE-BOOKING-WIDGET");
        body["tavolo"] = json!("T-1234");
        body["code_id"] = json!("c".repeat(51));
        let data = normalize(payload(body), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.nota.chars().count(), NOTE_MAX_CHARS);
        assert_eq!(data.fonte, "WEBSITE-BOOKING");
        assert_eq!(data.tavolo, "T-123");
        assert_eq!(data.code_id.len(), CODE_ID_MAX_CHARS);

        // Already-capped values stay as they are
        let again = cap("nota", data.nota.clone(), NOTE_MAX_CHARS, OverlongPolicy::Truncate);
        assert_eq!(again.unwrap(), data.nota);
    }

    #[test]
    fn test_caps_count_characters_not_bytes() {
        let data = normalize(with("tavolo", json!("àèìòù")), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.tavolo, "àèìòù");
    }

    #[test]
    fn test_caps_reject_policy() {
        let err = normalize(with("nota", json!("x".repeat(501))), OverlongPolicy::Reject)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FieldTooLong);
        assert_eq!(err.body()["field"], "nota");
        assert_eq!(err.body()["max"], 500);
    }

    #[test]
    fn test_aliases_feed_the_same_fields() {
        let mut body = minimal();
        body["note"] = json!("birthday");
        body["high_chairs"] = json!(2);
        body["status"] = json!("IN ATTESA");
        let data = normalize(payload(body), OverlongPolicy::Truncate).unwrap();
        assert_eq!(data.nota, "birthday");
        assert_eq!(data.seggiolini, 2);
        assert_eq!(data.stato, "IN ATTESA");
    }

    #[test]
    fn test_parse_query() {
        let query = |r: Option<&str>, d: Option<&str>| ReservationQuery {
            restaurant_id: r.map(str::to_string),
            date: d.map(str::to_string),
        };

        assert_eq!(
            parse_query(query(Some("1"), Some("2025-03-10"))).unwrap(),
            (1, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
        );
        assert_eq!(
            parse_query(query(None, Some("2025-03-10"))).unwrap_err().code,
            ErrorCode::MissingParameters
        );
        assert_eq!(
            parse_query(query(Some("1"), Some(""))).unwrap_err().code,
            ErrorCode::MissingParameters
        );
        assert_eq!(
            parse_query(query(Some("one"), Some("2025-03-10")))
                .unwrap_err()
                .code,
            ErrorCode::InvalidParameters
        );
        assert_eq!(
            parse_query(query(Some("1"), Some("2025-02-30"))).unwrap_err().code,
            ErrorCode::InvalidParameters
        );
    }
}
