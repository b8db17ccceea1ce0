//! API routes for derione-api
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | / | GET | none |
//! | /api/health | GET | none |
//! | /api/tcp-test | GET | none |
//! | /api/my-ip | GET | none |
//! | /api/reservations | GET, POST | `x-api-key` |
//!
//! Every route is rate limited; the limiter runs before the API key check.

pub mod diagnostics;
pub mod health;
pub mod reservation;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, header};
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{api_key_middleware, rate_limit_middleware};
use crate::state::AppState;

/// Response headers set on every response
const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-origin",
    ),
];

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Reservations (API key authenticated)
    let reservations = Router::new()
        .route(
            "/api/reservations",
            get(reservation::list_reservations).post(reservation::create_reservation),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::db_health))
        .route("/api/tcp-test", get(diagnostics::tcp_test))
        .route("/api/my-ip", get(diagnostics::my_ip))
        .merge(reservations)
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            name,
            HeaderValue::from_static(value),
        ));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
