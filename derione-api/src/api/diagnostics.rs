//! Network diagnostics for operators
//!
//! GET /api/tcp-test: raw TCP reachability of the database host
//! GET /api/my-ip: outbound IP as seen by a public echo service
//!
//! Neither endpoint touches the database protocol; they separate network
//! problems from credential or protocol problems.

use std::io;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use tokio::net::TcpStream;

use crate::state::AppState;

pub const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TcpStatus {
    Open,
    Timeout,
    Error,
}

/// Result of a raw TCP connect attempt
#[derive(Debug, Clone, Serialize)]
pub struct TcpProbe {
    pub ok: bool,
    pub host: String,
    pub port: u16,
    pub tcp: TcpStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn io_error_code(e: &io::Error) -> String {
    format!("{:?}", e.kind())
}

/// Open and immediately drop a TCP connection to `host:port`.
///
/// The stream (or the pending connect) is dropped on every path.
pub async fn probe_tcp(host: &str, port: u16, timeout: Duration) -> TcpProbe {
    let outcome = tokio::time::timeout(timeout, TcpStream::connect((host, port))).await;

    let (tcp, code, message) = match outcome {
        Ok(Ok(stream)) => {
            drop(stream);
            (TcpStatus::Open, None, None)
        }
        Ok(Err(e)) => (TcpStatus::Error, Some(io_error_code(&e)), Some(e.to_string())),
        Err(_) => (
            TcpStatus::Timeout,
            Some("TimedOut".to_string()),
            Some(format!("connect timed out after {}ms", timeout.as_millis())),
        ),
    };

    TcpProbe {
        ok: tcp == TcpStatus::Open,
        host: host.to_string(),
        port,
        tcp,
        code,
        message,
    }
}

/// GET /api/tcp-test: always 200, status in the body
pub async fn tcp_test(State(state): State<AppState>) -> Json<TcpProbe> {
    let probe = probe_tcp(&state.db_host, state.db_port, TCP_PROBE_TIMEOUT).await;
    if !probe.ok {
        tracing::warn!(
            host = %probe.host,
            port = probe.port,
            status = ?probe.tcp,
            "Database host not reachable"
        );
    }
    Json(probe)
}

fn upstream_error(e: reqwest::Error) -> AppError {
    let message = e.to_string();
    AppError::with_message(ErrorCode::UpstreamProbeError, message.clone())
        .with_detail("message", message)
}

/// GET /api/my-ip: relay the IP echo service's JSON
pub async fn my_ip(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let body: Value = state
        .http
        .get(&state.ip_probe_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(upstream_error)?
        .json()
        .await
        .map_err(upstream_error)?;
    Ok(Json(body))
}
