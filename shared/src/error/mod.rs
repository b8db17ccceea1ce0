//! Error system for the reservations API
//!
//! - [`ErrorCode`]: Standardized error codes with HTTP status and wire name
//! - [`AppError`]: Error with code, message and extra body fields
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Access errors
//! - 4xxx: Reservation errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::invalid_field("covers");
//! assert_eq!(err.code, ErrorCode::InvalidFields);
//! assert_eq!(err.body()["error"], "invalid_fields");
//! ```

mod codes;
mod http;
mod types;

pub use codes::ErrorCode;
pub use types::{AppError, AppResult};
