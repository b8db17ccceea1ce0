//! Error codes for the reservations API
//!
//! Codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Access errors (auth, rate limiting)
//! - 4xxx: Reservation errors
//! - 9xxx: System errors
//!
//! Every code also has a stable snake_case [`ErrorCode::name`], which is what
//! clients see in the `error` field of a response body.

use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Request body is not valid JSON
    InvalidJson = 2,
    /// Request body exceeds the configured limit
    PayloadTooLarge = 3,

    // ==================== 1xxx: Access ====================
    /// Missing or wrong API key
    Unauthorized = 1001,
    /// Too many requests in the current window
    RateLimited = 1002,

    // ==================== 4xxx: Reservation ====================
    /// Required query parameters are missing
    MissingParameters = 4001,
    /// Query parameters could not be coerced
    InvalidParameters = 4002,
    /// Required payload fields are missing
    MissingFields = 4003,
    /// Payload fields could not be coerced
    InvalidFields = 4004,
    /// A capped string field exceeds its limit (reject policy)
    FieldTooLong = 4005,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Outbound diagnostic probe failed
    UpstreamProbeError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// System errors (9xxx) are logged when turned into a response
    #[inline]
    pub const fn is_system(&self) -> bool {
        self.code() >= 9000
    }

    /// Stable wire name, used as the `error` value in response bodies
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::PayloadTooLarge => "payload_too_large",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::MissingParameters => "missing_params",
            ErrorCode::InvalidParameters => "invalid_params",
            ErrorCode::MissingFields => "missing_fields",
            ErrorCode::InvalidFields => "invalid_fields",
            ErrorCode::FieldTooLong => "field_too_long",
            ErrorCode::DatabaseError => "database_error",
            ErrorCode::UpstreamProbeError => "upstream_error",
        }
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "Request body is not valid JSON",
            ErrorCode::PayloadTooLarge => "Request body is too large",
            ErrorCode::Unauthorized => "Missing or invalid API key",
            ErrorCode::RateLimited => "Too many requests, try again later",
            ErrorCode::MissingParameters => "restaurant_id and date are required",
            ErrorCode::InvalidParameters => "Invalid query parameter",
            ErrorCode::MissingFields => {
                "restaurant_id, date, time, first_name, phone and covers are required"
            }
            ErrorCode::InvalidFields => "Invalid field value",
            ErrorCode::FieldTooLong => "Field exceeds its maximum length",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::UpstreamProbeError => "Upstream probe failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
