//! Service-layer error type for derione-api
//!
//! `ServiceError` bridges store errors (`StoreError`) and the API-layer error
//! (`AppError`), so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::AppError;

use crate::db::StoreError;

/// Service-layer error
///
/// - `Store`: Database failure (logged, mapped to `database_error`)
/// - `App`: Validation error (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database failure with upstream diagnostics
    Store(StoreError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => {
                tracing::error!(
                    code = store_err.code.as_deref().unwrap_or("-"),
                    error = %store_err,
                    "Service database error"
                );
                AppError::database(store_err.code, store_err.message)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
