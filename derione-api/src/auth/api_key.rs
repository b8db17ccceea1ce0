//! Shared-secret authentication for the reservation routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use subtle::ConstantTimeEq;

use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time comparison of the presented key against the configured one
pub fn key_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Middleware that rejects requests without the configured `x-api-key`
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(path = %request.uri().path(), "Missing API key");
            AppError::unauthorized().into_response()
        })?;

    if !key_matches(presented, &state.api_key) {
        tracing::debug!(path = %request.uri().path(), "API key mismatch");
        return Err(AppError::unauthorized().into_response());
    }

    Ok(next.run(request).await)
}
