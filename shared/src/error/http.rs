//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 401 Unauthorized
            Self::Unauthorized => StatusCode::UNAUTHORIZED,

            // 413 Payload Too Large
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::DatabaseError | Self::UpstreamProbeError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation errors)
            Self::InvalidJson
            | Self::MissingParameters
            | Self::InvalidParameters
            | Self::MissingFields
            | Self::InvalidFields
            | Self::FieldTooLong => StatusCode::BAD_REQUEST,
        }
    }
}
