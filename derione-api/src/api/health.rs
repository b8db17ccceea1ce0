//! Liveness and database health endpoints

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

pub const BANNER: &str = "deRione API running";

/// GET /: plain-text liveness banner, no dependency checks
pub async fn root() -> &'static str {
    BANNER
}

/// GET /api/health: round trip to the database
pub async fn db_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true, "db": "ok" }))),
        Err(e) => {
            tracing::warn!(code = e.code.as_deref().unwrap_or("-"), error = %e, "Database health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "ok": false,
                    "db": "down",
                    "code": e.code,
                    "message": e.message,
                })),
            )
        }
    }
}
