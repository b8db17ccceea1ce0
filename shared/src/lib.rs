//! Shared types for derione
//!
//! Error codes, the error response type and the reservation models used by
//! the API server.

pub mod error;
pub mod models;
