//! Reservation API handlers
//!
//! - `GET /api/reservations?restaurant_id=&date=`: list one restaurant's day
//! - `POST /api/reservations`: create a reservation

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::reservation::{
    ReservationCreate, ReservationCreated, ReservationList, ReservationQuery,
};

use crate::services::reservation as service;
use crate::state::AppState;

type ApiResult<T> = Result<T, AppError>;

fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::PayloadTooLarge)
    } else {
        tracing::debug!(error = %rejection.body_text(), "Failed to read reservation body");
        AppError::new(ErrorCode::InvalidJson)
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Decode the create body.
///
/// A body that is not declared as JSON, an empty body and a JSON `null` all
/// read as an empty payload, so the presence check reports the missing
/// fields. Malformed JSON and non-object documents are `invalid_json`.
fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Result<ReservationCreate, AppError> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReservationCreate::default());
    }
    let invalid = |e: serde_json::Error| {
        tracing::debug!(error = %e, "Rejected reservation body");
        AppError::new(ErrorCode::InvalidJson)
    };
    match serde_json::from_slice::<Value>(body).map_err(invalid)? {
        Value::Null => Ok(ReservationCreate::default()),
        object @ Value::Object(_) => serde_json::from_value(object).map_err(invalid),
        _ => Err(AppError::new(ErrorCode::InvalidJson)),
    }
}

// ── GET /api/reservations ──

pub async fn list_reservations(
    State(state): State<AppState>,
    query: Result<Query<ReservationQuery>, QueryRejection>,
) -> ApiResult<Json<ReservationList>> {
    let Query(query) = query.map_err(|_| AppError::invalid_param("query"))?;
    let items = service::list_reservations(state.store.as_ref(), query).await?;
    Ok(Json(ReservationList { items }))
}

// ── POST /api/reservations ──

pub async fn create_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<ReservationCreated>)> {
    let body = body.map_err(body_rejection)?;
    let payload = parse_payload(&headers, &body)?;
    let (id, reservation) =
        service::create_reservation(state.store.as_ref(), payload, state.overlong_policy).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreated {
            id,
            message: service::CREATED_MESSAGE.to_string(),
            reservation,
        }),
    ))
}
