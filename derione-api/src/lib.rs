//! derione-api: reservations HTTP API
//!
//! Create/list operations over the `Prenotazioni` table, guarded by a shared
//! API key and a fixed-window rate limiter, plus health and network
//! diagnostics.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;

pub use config::Config;
pub use state::AppState;
