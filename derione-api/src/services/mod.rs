//! Business logic between the HTTP handlers and the store

pub mod reservation;
